use kinrig::route::{hang_on_wall, hang_solver, Route, LEG_EFFECTORS};
use tracing_subscriber::EnvFilter;

/// cargo run --example print -- [rig name or RON file] [route file]
fn main() -> Result<(), kinrig::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mut registry = kinrig::RigRegistry::<f64>::with_builtin()?;
    let name = match args.next() {
        Some(arg) if arg.ends_with(".ron") => registry.load_file(&arg)?,
        Some(arg) => arg,
        None => "taiwan_bear".to_owned(),
    };
    let rig = registry.get(&name)?;
    println!("{} (revision {}, {} dof)", rig.name(), rig.revision(), rig.dof());
    println!("{rig}");

    let frames = rig.home_frames(None)?;
    for (effector, trans) in frames.effectors(rig) {
        let p = trans.fixed_view::<3, 1>(0, 3);
        println!("{effector}: [{:.4}, {:.4}, {:.4}]", p[0], p[1], p[2]);
    }

    if let Some(path) = args.next() {
        let route = Route::from_file(&path, Route::<f64>::DEFAULT_DX, Route::<f64>::DEFAULT_DY)?;
        println!("route level {} with {} holds", route.level(), route.len());
        let hang = hang_on_wall(
            rig,
            rig.home_pose(),
            &route,
            None,
            &LEG_EFFECTORS,
            &hang_solver(),
        )?;
        for grip in &hang.grips {
            let mark = if grip.gripped { "x" } else { " " };
            println!(
                "[{mark}] {} -> {} (distance {:.4}, {} iterations)",
                grip.effector,
                grip.hold,
                grip.error.norm(),
                grip.iterations
            );
        }
    }
    Ok(())
}
