use approx::assert_relative_eq;
use kinrig::*;
use nalgebra::{Matrix4, Vector3};

fn target_of(rig: &Rig<f64>, pose: &Pose<f64>, effector: &str, base: Option<&Matrix4<f64>>) -> Vector3<f64> {
    rig.forward_kinematics(pose, base)
        .unwrap()
        .position(effector)
        .unwrap()
}

#[test]
fn test_ik_three_link_arm() {
    let rig = builtin::three_link_arm::<f64>().unwrap();
    let mut goal = Pose::new();
    goal.insert("joint_1_XYZ", [0.3, 0.0, 0.0]);
    goal.insert("joint_2_XYZ", [0.5, 0.0, 0.0]);
    let target = target_of(&rig, &goal, "end_effector", None);

    let solver = JacobianTransposeSolverBuilder::new()
        .step(0.004)
        .max_iterations(2000)
        .finalize();
    let solution = solver
        .solve(&rig, &Pose::new(), "end_effector", &target, None)
        .unwrap();
    assert!(solution.iterations > 0);
    assert!(solution.error.norm_squared() < 1e-4);
    assert_eq!(solution.pose.len(), 3);

    let reached = solution.frames.position("end_effector").unwrap();
    assert_relative_eq!(reached, target, epsilon = 1e-2);
    assert_relative_eq!(
        target_of(&rig, &solution.pose, "end_effector", None),
        reached,
        epsilon = 1e-12
    );
}

#[test]
fn test_ik_taiwan_bear_head() {
    let rig = builtin::taiwan_bear::<f64>().unwrap();
    let mut goal = rig.home_pose().clone();
    goal.insert("RJoint_Head_XYZ_C", [0.2, -0.1, 0.3]);
    goal.insert("RJoint_Torso_XYZ_C", [0.0, 0.1, 0.0]);
    let target = target_of(&rig, &goal, "Effector_Head_C", None);

    let solver = JacobianTransposeSolverBuilder::new().step(0.1).finalize();
    let solution = solver
        .solve(&rig, rig.home_pose(), "Effector_Head_C", &target, None)
        .unwrap();
    assert!(solution.error.norm_squared() < 1e-4);
    assert_eq!(solution.pose.len(), 14);
    // joints which do not move the head keep the home angles
    assert_eq!(
        solution.pose.get("RJoint_Back_Lower_Z_L"),
        Some(&JointValue::Single(std::f64::consts::FRAC_PI_4))
    );
    assert_eq!(
        solution.pose.get("RJoint_Front_Upper_XYZ_R"),
        Some(&JointValue::triple([0.0, 0.0, 0.0]))
    );
}

#[test]
fn test_ik_taiwan_bear_front_leg() {
    let rig = builtin::taiwan_bear::<f64>().unwrap();
    let mut goal = rig.home_pose().clone();
    goal.insert("RJoint_Front_Upper_XYZ_L", [0.2, 0.3, -0.2]);
    let target = target_of(&rig, &goal, "Effector_Front_L", None);

    let solver = JacobianTransposeSolverBuilder::new()
        .step(0.1)
        .max_iterations(200)
        .finalize();
    let solution = solver
        .solve(&rig, rig.home_pose(), "Effector_Front_L", &target, None)
        .unwrap();
    assert!(solution.error.norm_squared() < 1e-4);
    assert_relative_eq!(
        solution.frames.position("Effector_Front_L").unwrap(),
        target,
        epsilon = 1e-2
    );
    assert_eq!(
        solution.frames.get("Effector_Back_R"),
        rig.home_frames(None).unwrap().get("Effector_Back_R")
    );
}

#[test]
fn test_ik_with_base() {
    let rig = builtin::three_link_arm::<f64>().unwrap();
    let base = Matrix4::new_translation(&Vector3::new(5.0, 0.0, -1.0));
    let mut goal = Pose::new();
    goal.insert("joint_1_XYZ", [0.0, 0.5, 0.0]);
    goal.insert("joint_2_XYZ", [0.0, 0.8, 0.0]);
    let target = target_of(&rig, &goal, "end_effector", Some(&base));

    let solver = JacobianTransposeSolverBuilder::new()
        .step(0.004)
        .max_iterations(2000)
        .finalize();
    let solution = solver
        .solve(&rig, &Pose::new(), "end_effector", &target, Some(&base))
        .unwrap();
    assert!(solution.error.norm_squared() < 1e-4);
    assert_relative_eq!(
        *solution.frames.get("base").unwrap(),
        base * rig.root().offset
    );
}

#[test]
fn test_ik_partial_keeps_progress() {
    let rig = builtin::taiwan_bear::<f64>().unwrap();
    let home = rig.home_frames(None).unwrap();
    let start = home.position("Effector_Front_L").unwrap();
    let target = start + Vector3::new(0.6, 0.6, 0.6);

    let solver = JacobianTransposeSolverBuilder::new()
        .step(0.1)
        .tolerance(0.05)
        .max_iterations(10)
        .finalize();
    let solution = solver
        .solve_partial(&rig, rig.home_pose(), "Effector_Front_L", &target, None)
        .unwrap();
    assert!(!solution.converged);
    assert_eq!(solution.iterations, 10);
    assert_relative_eq!((target - start).norm(), 1.0392, epsilon = 1e-4);
    assert!(solution.distance() < 0.35);

    // the partial pose is usable as is
    let frames = rig.forward_kinematics(&solution.pose, None).unwrap();
    assert_relative_eq!(
        (target - frames.position("Effector_Front_L").unwrap()).norm(),
        solution.distance(),
        epsilon = 1e-12
    );
    assert!(matches!(
        solver.solve(&rig, rig.home_pose(), "Effector_Front_L", &target, None),
        Err(Error::NotConverged { iterations: 10, distance }) if distance < 0.35
    ));
}

#[test]
fn test_ik_errors() {
    let rig = builtin::taiwan_bear::<f64>().unwrap();
    let solver = JacobianTransposeSolver::<f64>::default();

    let mut pose = Pose::new();
    pose.insert("RJoint_Wing_Z_L", 0.1);
    assert!(matches!(
        solver.solve(&rig, &pose, "Effector_Head_C", &Vector3::zeros(), None),
        Err(Error::UnknownJointName { .. })
    ));
    assert!(matches!(
        solver.solve(&rig, &Pose::new(), "Effector_Tail_C", &Vector3::zeros(), None),
        Err(Error::Precondition { .. })
    ));

    let arm = builtin::three_link_arm::<f64>().unwrap();
    let solver = JacobianTransposeSolverBuilder::new()
        .step(0.004)
        .max_iterations(5)
        .finalize();
    match solver.solve(
        &arm,
        &Pose::new(),
        "end_effector",
        &Vector3::new(0.0, 0.0, 40.0),
        None,
    ) {
        Err(Error::NotConverged {
            iterations,
            distance,
        }) => {
            assert_eq!(iterations, 5);
            // bending the straight arm only moves the effector away
            assert!(distance > 21.0);
        }
        other => panic!("unexpected {other:?}"),
    }
}
