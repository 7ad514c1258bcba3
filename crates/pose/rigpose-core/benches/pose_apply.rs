use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rigpose_core::{
    catalog::{humanoid, JointCatalog},
    config::SolverConfig,
    frame::FrameData,
    rest_pose::RestPose,
    stream::{FrameProcessor, PoseSink},
    Pose, Result,
};

struct Discard;

impl PoseSink for Discard {
    fn on_pose(&mut self, _rig_id: &str, _frame: i32, pose: &Pose) -> Result<()> {
        black_box(pose);
        Ok(())
    }
}

fn frames(rigs: usize, per_rig: i32) -> Vec<FrameData> {
    let mut out = Vec::with_capacity(rigs * per_rig as usize);
    for f in 0..per_rig {
        for r in 0..rigs {
            let mut frame = FrameData::identity(format!("p{r}"), f, [0.0, 0.9, 0.0], humanoid::JOINT_COUNT);
            let s = (0.1 * f as f64).sin() * 0.3;
            for j in 0..humanoid::JOINT_COUNT {
                frame.set_rotation(j, [s, 0.0, 0.0, (1.0 - s * s).sqrt()]);
            }
            out.push(frame);
        }
    }
    out
}

fn bench_apply(c: &mut Criterion) {
    let rest = RestPose::from_catalog(&JointCatalog::humanoid(), SolverConfig::default())
        .expect("humanoid rest pose");
    let frame = frames(1, 1).remove(0);

    c.bench_function("humanoid_apply", |b| {
        b.iter(|| rest.apply_frame(black_box(&frame)).expect("pose"))
    });

    let stream = frames(4, 250);
    c.bench_function("humanoid_stream_1000_frames", |b| {
        b.iter_batched(
            || FrameProcessor::new(&rest),
            |mut processor| {
                processor.run(&stream, &mut Discard);
                processor.report().forwarded
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_apply);
criterion_main!(benches);
