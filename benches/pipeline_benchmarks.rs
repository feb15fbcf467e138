//! Per-tick pipeline cost with constant-time mock models

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use face_follow_arm::{
    config::Config,
    face_detection::{Detection, FaceDetector},
    mark_detection::LandmarkModel,
    pipeline::Pipeline,
    pose_estimation::{HeadPose, HeadPoseModel},
    Result,
};
use opencv::{
    core::{Mat, Point2f, CV_8UC3},
    prelude::*,
};

struct StillFace;

impl FaceDetector for StillFace {
    fn detect(&mut self, _frame: &Mat) -> Result<Vec<Detection>> {
        Ok(vec![Detection {
            class_id: 1.0,
            confidence: 0.9,
            x0: 0.375,
            y0: 0.25,
            x1: 0.625,
            y1: 0.75,
        }])
    }
}

struct StillPose;

impl HeadPoseModel for StillPose {
    fn estimate(&mut self, _face: &Mat) -> Result<HeadPose> {
        Ok(HeadPose { yaw: 5.0, pitch: -3.0, roll: 1.0 })
    }
}

struct StillMarks;

impl LandmarkModel for StillMarks {
    fn detect(&mut self, _face: &Mat) -> Result<Vec<Point2f>> {
        Ok(vec![
            Point2f::new(0.35, 0.4),
            Point2f::new(0.65, 0.4),
            Point2f::new(0.5, 0.6),
            Point2f::new(0.4, 0.8),
            Point2f::new(0.6, 0.8),
        ])
    }
}

fn benchmark_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_tick");
    let Ok(zeros) = Mat::zeros(720, 1280, CV_8UC3) else {
        return;
    };
    let Ok(frame) = zeros.to_mat() else {
        return;
    };

    for (detect_every, sample_every) in [(1, 1), (5, 2), (10, 5)] {
        let mut config = Config::default();
        config.face_detection.detect_every = detect_every;
        config.pose.sample_every = sample_every;
        let Ok(mut pipeline) = Pipeline::new(&config, StillFace, StillPose, StillMarks) else {
            continue;
        };

        group.bench_with_input(
            BenchmarkId::new("cadence", format!("{detect_every}_{sample_every}")),
            &frame,
            |b, frame| {
                b.iter(|| black_box(pipeline.tick(black_box(frame)).map(|out| out.elbow).ok()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_ticks);
criterion_main!(benches);
