//! End-to-end runs of the production pipeline on the furniture shop.

use rstest::rstest;
use shopmix_core::*;

fn solve(scenario: &Scenario) -> Outcome {
    run(scenario, &MilpAdapter::new()).unwrap()
}

fn assert_plan_is_sound(scenario: &Scenario, result: &ProductionResult) {
    let model = scenario.build_model().unwrap();

    // Feasibility: every row of the model holds at the plan
    for constraint in &model.constraints {
        assert!(
            constraint.is_satisfied(&result.production, 1e-9),
            "{} violated: lhs {} {} {}",
            constraint.name,
            constraint.lhs(&result.production),
            constraint.relation,
            constraint.bound
        );
    }

    // Integrality is carried by the type; floors must hold
    for product in &scenario.products {
        assert!(result.quantity(&product.name) as f64 >= scenario.floors.get(&product.name));
        assert!(result.quantity(&product.name) >= 0);
    }

    // Objective consistency
    let expected: f64 = scenario
        .products
        .iter()
        .map(|p| p.profit_per_unit * result.quantity(&p.name) as f64)
        .sum();
    assert_eq!(result.profit, expected);

    // Utilization bounds and binding-set correctness
    for (resource, &pct) in &result.utilization_pct {
        assert!(pct >= 0.0 && pct <= 100.0 + BINDING_EPSILON, "{resource} at {pct}%");
        assert_eq!(result.is_binding(resource), (pct - 100.0).abs() < BINDING_EPSILON);
    }
}

#[test]
fn test_furniture_optimum() {
    let scenario = Scenario::furniture();
    let outcome = solve(&scenario);
    let result = outcome.result().expect("furniture scenario is feasible");

    assert_eq!(result.quantity(&ProductId::from("table")), 10);
    assert_eq!(result.quantity(&ProductId::from("chair")), 50);
    assert_eq!(result.profit, 6200.0);

    let labor = ResourceId::from("labor_hours");
    let wood = ResourceId::from("wood");
    let machine = ResourceId::from("machine_time");
    assert_eq!(result.usage[&labor], 330.0);
    assert_eq!(result.usage[&wood], 800.0);
    assert_eq!(result.usage[&machine], 140.0);
    assert!((result.utilization_pct[&labor] - 82.5).abs() < 1e-9);
    assert!((result.utilization_pct[&wood] - 100.0).abs() < 1e-9);
    assert!((result.utilization_pct[&machine] - 93.33).abs() < 0.01);

    assert_eq!(result.binding_constraints.len(), 1);
    assert!(result.is_binding(&wood));

    assert_plan_is_sound(&scenario, result);
}

#[test]
fn test_furniture_shadow_prices() {
    let outcome = solve(&Scenario::furniture());
    let prices = &outcome.result().unwrap().shadow_prices;

    assert_eq!(prices.len(), 5);
    // One more board foot of wood buys a tenth of a chair
    assert!((prices["wood_capacity"] - 8.0).abs() < 1e-6);
    // Each extra required table displaces three chairs
    assert!((prices["table_minimum"] + 20.0).abs() < 1e-6);
    assert!(prices["labor_hours_capacity"].abs() < 1e-6);
    assert!(prices["machine_time_capacity"].abs() < 1e-6);
    assert!(prices["chair_minimum"].abs() < 1e-6);
}

#[test]
fn test_floor_beyond_capacity_is_infeasible() {
    let mut scenario = Scenario::furniture();
    // 30 tables need 900 board feet of wood
    scenario.floors = ProductionFloor::new().with("table", 30.0).with("chair", 20.0);

    let outcome = solve(&scenario);

    assert_eq!(
        outcome,
        Outcome::Rejected(SolveFailure {
            status: SolveStatus::Infeasible
        })
    );
}

#[test]
fn test_free_product_is_unbounded() {
    let mut scenario = Scenario::furniture();
    scenario.products.push(ProductSpec::new("gift_card", 5.0));

    let outcome = solve(&scenario);

    assert_eq!(outcome.failure().map(|f| f.status), Some(SolveStatus::Unbounded));
}

#[test]
fn test_invalid_parameters_fail_before_solving() {
    let mut scenario = Scenario::furniture();
    scenario.limits = ResourceLimits::new().with("labor_hours", 400.0).with("wood", 800.0);

    let err = run(&scenario, &MilpAdapter::new()).unwrap_err();

    assert_eq!(
        err,
        PipelineError::Model(ModelError::UnknownResource {
            product: ProductId::from("table"),
            resource: ResourceId::from("machine_time"),
        })
    );
}

#[rstest]
#[case(400.0, 800.0, 150.0)]
#[case(400.0, 1000.0, 150.0)]
#[case(250.0, 800.0, 150.0)]
#[case(400.0, 800.0, 100.0)]
#[case(1000.0, 2000.0, 1000.0)]
fn test_plans_are_sound_across_limits(#[case] labor: f64, #[case] wood: f64, #[case] machine: f64) {
    let mut scenario = Scenario::furniture();
    scenario.limits = ResourceLimits::new()
        .with("labor_hours", labor)
        .with("wood", wood)
        .with("machine_time", machine);

    let outcome = solve(&scenario);
    let result = outcome.result().expect("floors fit within every case");

    assert_plan_is_sound(&scenario, result);
}

#[test]
fn test_fractional_relaxation_is_rounded_by_branching() {
    // 7 units of wood cannot be split evenly: the LP wants 2.33 stools
    let scenario = Scenario {
        products: vec![
            ProductSpec::new("stool", 10.0).with_usage("wood", 3.0),
            ProductSpec::new("shelf", 3.0).with_usage("wood", 1.0),
        ],
        limits: ResourceLimits::new().with("wood", 7.0),
        floors: ProductionFloor::new(),
    };

    let outcome = solve(&scenario);
    let result = outcome.result().unwrap();

    assert_eq!(result.quantity(&ProductId::from("stool")), 2);
    assert_eq!(result.quantity(&ProductId::from("shelf")), 1);
    assert_eq!(result.profit, 23.0);
    assert!(result.is_binding(&ResourceId::from("wood")));
    assert_plan_is_sound(&scenario, result);
}

#[test]
fn test_independent_scenarios_solve_in_parallel() {
    let scenarios: Vec<Scenario> = [600.0, 800.0, 1000.0]
        .into_iter()
        .map(|wood| {
            let mut s = Scenario::furniture();
            s.limits = s.limits.clone().with("wood", wood);
            s
        })
        .collect();

    let profits: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = scenarios
            .iter()
            .map(|s| scope.spawn(move || solve(s).result().map(|r| r.profit)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
    });

    assert_eq!(profits[1], 6200.0);
    assert!(profits[0] < profits[1] && profits[1] < profits[2]);
}
