use env_logger::{Builder, Env};
use optiseed_doe::{
    build_search_space, evaluate, generate, Dimension, GreedyStart, Result, SeedOptions,
    StrategyKind, OPTISEED_LOG,
};

fn main() -> Result<()> {
    let env = Env::new().filter_or(OPTISEED_LOG, "info");
    Builder::from_env(env)
        .target(env_logger::Target::Stdout)
        .try_init()
        .ok();

    let space = build_search_space(&[
        Dimension::continuous("x", -10., 10.),
        Dimension::continuous("y", 5., 15.),
        Dimension::integer("layers", 1, 6),
        Dimension::categorical("activation", ["relu", "tanh", "sigmoid"]),
    ])?
    .with_constraint("x+y", |x| x[0] + x[1] <= 15.);
    let n = 16;

    println!("Take {n} seeds in");
    println!("{}\n", space.xlimits());

    for kind in StrategyKind::ALL {
        let options = match kind {
            StrategyKind::LatinHypercube => SeedOptions::new().optimize(true),
            StrategyKind::Sobol => SeedOptions::new().scramble(true),
            StrategyKind::GreedyFarthest => SeedOptions::new().greedy_start(GreedyStart::Center),
            StrategyKind::Random => SeedOptions::new(),
        };
        let pop = generate(&space, kind.name(), n, 42, &options)?;
        println!("*** using {kind} sampling");
        println!("{}", pop.points());
        for (key, value) in pop.metadata() {
            println!("  {key}: {value}");
        }
        for (metric, score) in evaluate(&pop).as_map() {
            println!("  {metric} = {score:.6}");
        }
        println!();
    }
    Ok(())
}
