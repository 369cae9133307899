use std::fmt::{self, Write};

use shopmix_core::{ProductionResult, Scenario};

/// `labor_hours` -> `Labor Hours`
fn title_case(id: &str) -> String {
    id.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn production_line(scenario: &Scenario, result: &ProductionResult) -> String {
    let parts: Vec<String> = scenario
        .products
        .iter()
        .map(|p| format!("{} {}s", result.quantity(&p.name), p.name))
        .collect();
    match parts.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
        None => String::new(),
    }
}

pub fn render(
    out: &mut impl Write,
    scenario: &Scenario,
    result: &ProductionResult,
    analysis: bool,
) -> fmt::Result {
    writeln!(out, "Optimization Results:")?;
    writeln!(out, "Optimal Production: {}", production_line(scenario, result))?;
    writeln!(out, "Optimal Profit: ${:.2}", result.profit)?;

    writeln!(out)?;
    writeln!(out, "Resource Usage:")?;
    for (resource, usage) in &result.usage {
        let pct = result.utilization_pct.get(resource).copied().unwrap_or(0.0);
        writeln!(out, "  {}: {:.2} units ({:.2}%)", title_case(resource.as_str()), usage, pct)?;
    }

    writeln!(out)?;
    writeln!(out, "Binding Constraints:")?;
    if result.binding_constraints.is_empty() {
        writeln!(out, "  None")?;
    }
    for resource in &result.binding_constraints {
        writeln!(out, "  {}", title_case(resource.as_str()))?;
    }

    if !analysis {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Shadow Prices:")?;
    for (name, value) in &result.shadow_prices {
        writeln!(out, "  {:30} {:10.4}", name, value)?;
    }

    writeln!(out)?;
    writeln!(out, "Slack:")?;
    for (resource, slack) in &result.slack {
        writeln!(out, "  {:30} {:10.2}", title_case(resource.as_str()), slack)?;
    }

    writeln!(out)?;
    writeln!(out, "Reduced Costs (products held out of the plan):")?;
    let mut any = false;
    for (product, rc) in &result.reduced_costs {
        if rc.abs() > 0.001 {
            any = true;
            writeln!(out, "  {:20} profit falls by {:.2} per unit forced in", product.as_str(), -rc)?;
        }
    }
    if !any {
        writeln!(out, "  None")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopmix_core::{MilpAdapter, ProductId, run};
    use std::collections::BTreeMap;

    fn render_to_string(scenario: &Scenario, result: &ProductionResult, analysis: bool) -> String {
        let mut out = String::new();
        render(&mut out, scenario, result, analysis).unwrap();
        out
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("labor_hours"), "Labor Hours");
        assert_eq!(title_case("wood"), "Wood");
    }

    #[test]
    fn test_render_furniture_report() {
        let scenario = Scenario::furniture();
        let outcome = run(&scenario, &MilpAdapter::new()).unwrap();
        let report = render_to_string(&scenario, outcome.result().unwrap(), false);

        assert!(report.contains("Optimal Production: 10 tables and 50 chairs"));
        assert!(report.contains("Optimal Profit: $6200.00"));
        assert!(report.contains("  Labor Hours: 330.00 units (82.50%)"));
        assert!(report.contains("  Wood: 800.00 units (100.00%)"));
        assert!(report.contains("  Machine Time: 140.00 units (93.33%)"));
        assert!(report.ends_with("Binding Constraints:\n  Wood\n"));
        assert!(!report.contains("Shadow Prices"));
    }

    #[test]
    fn test_render_analysis_section() {
        let scenario = Scenario::furniture();
        let outcome = run(&scenario, &MilpAdapter::new()).unwrap();
        let report = render_to_string(&scenario, outcome.result().unwrap(), true);

        assert!(report.contains("Shadow Prices:"));
        assert!(report.contains("wood_capacity"));
        assert!(report.contains("Slack:"));
        // Both products are made, so nothing is held out
        assert!(report.ends_with("Reduced Costs (products held out of the plan):\n  None\n"));
    }

    #[test]
    fn test_render_nonzero_reduced_cost() {
        let scenario = Scenario::furniture();
        let outcome = run(&scenario, &MilpAdapter::new()).unwrap();
        let mut result = outcome.result().unwrap().clone();
        result.reduced_costs = BTreeMap::from([
            (ProductId::from("table"), -12.5),
            (ProductId::from("chair"), 0.0),
        ]);

        let report = render_to_string(&scenario, &result, true);

        assert!(report.contains("table"));
        assert!(report.contains("profit falls by 12.50 per unit forced in"));
        assert!(report.contains("  table                profit falls"));
        assert!(!report.contains("chair                profit falls"));
    }
}
