use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kinrig::*;
use nalgebra::DVector;
use std::f64::consts::PI;

fn generate_random_pose(rig: &Rig<f64>, layout: &ConfigLayout) -> Pose<f64> {
    let q = DVector::from_fn(layout.len(), |_, _| {
        (rand::random::<f64>() - 0.5) * 2.0 * PI
    });
    let mut pose = layout.to_pose(&q).unwrap();
    // keep an effector entry, it must be skipped
    pose.insert(&rig.effector_names()[0], 1.0);
    pose
}

fn bench_fk_taiwan_bear(c: &mut Criterion) {
    let rig = builtin::taiwan_bear::<f64>().unwrap();
    let layout = ConfigLayout::new(&rig);
    let pose = generate_random_pose(&rig, &layout);
    c.bench_function("fk_taiwan_bear", |b| {
        b.iter(|| {
            let frames = rig.forward_kinematics(black_box(&pose), None).unwrap();
            assert_eq!(frames.len(), 20);
            frames
        })
    });
}

fn bench_fk_taiwan_bear_f32(c: &mut Criterion) {
    let rig = builtin::taiwan_bear::<f32>().unwrap();
    c.bench_function("fk_taiwan_bear_f32_home", |b| {
        b.iter(|| rig.home_frames(black_box(None)).unwrap())
    });
}

fn bench_pose_to_vector(c: &mut Criterion) {
    let rig = builtin::taiwan_bear::<f64>().unwrap();
    let layout = ConfigLayout::new(&rig);
    let pose = generate_random_pose(&rig, &layout);
    c.bench_function("layout_to_vector", |b| {
        b.iter(|| layout.to_vector(&rig, black_box(&pose)).unwrap())
    });
}

fn bench_load_description(c: &mut Criterion) {
    c.bench_function("load_taiwan_bear", |b| {
        b.iter(|| {
            RigDescription::from_ron_str(black_box(builtin::TAIWAN_BEAR))
                .unwrap()
                .into_rig::<f64>()
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_fk_taiwan_bear,
    bench_fk_taiwan_bear_f32,
    bench_pose_to_vector,
    bench_load_description
);
criterion_main!(benches);
