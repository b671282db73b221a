use gridrl::*;
use std::rc::Rc;

const THETA: Continous = 1e-8;
const EVAL_EPISODES: usize = 2000;
const TRAIN_EPISODES: usize = 5000;
const TEST_EPISODES: usize = 1000;

fn main() -> Result<()> {
    let mdp = Rc::new(FrozenLake::new(1.)) as Rc<dyn Mdp>;

    let pi = &mut PolicyIteration::new(Rc::clone(&mdp))?;
    let rounds = pi.exec(THETA, None)?;
    println!("Theta: {THETA}, Improvement rounds: {rounds}");

    let v_star = (0..mdp.n_s())
        .map(|s| pi.v_star(s as Discrete))
        .collect::<Vec<_>>();
    println!("{v_star:?}");
    let pi_star = (0..mdp.n_s())
        .map(|s| pi.pi_star(s as Discrete))
        .collect::<Vec<_>>();
    println!("{pi_star:?}");

    let policy = MdpSolverPolicy {
        mdp_solver: Rc::new(pi.clone()),
    };
    let sim = &mut TableSimulator::new(mdp.transitions(), 2718);
    let stats = run_episodes(sim, &policy, EVAL_EPISODES)?;
    println!(
        "Policy iteration: predicted {:.4}, empirical {}",
        pi.v_star(0),
        serde_json::to_string(&stats).expect("report is serializable")
    );

    for strategy in [
        ExplorationStrategy::Random,
        ExplorationStrategy::BoundedGreedy,
        ExplorationStrategy::Softmax,
    ] {
        let mc = &mut MonteCarloControl::new(Rc::clone(&mdp), 2718);
        let report = mc.train_and_evaluate(strategy, TRAIN_EPISODES, TEST_EPISODES)?;
        println!(
            "{}",
            serde_json::to_string(&report).expect("report is serializable")
        );
    }

    Ok(())
}
