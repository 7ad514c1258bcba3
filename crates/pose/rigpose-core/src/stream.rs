//! Frame processing: validation → pose applier → sink.
//!
//! A bad frame is logged, recorded in the [`ProcessReport`] and skipped; the stream
//! keeps going. Frames of one rig are forwarded in non-decreasing frame order.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::Serialize;
use tracing::{trace, warn};

use crate::bounds::{FrameBounds, FrameRange};
use crate::error::PoseError;
use crate::frame::FrameData;
use crate::pose::Pose;
use crate::rest_pose::RestPose;
use crate::validate::validate_frame;
use crate::Result;

/// Consumer of resolved poses (viewport, CSV writer, ...).
pub trait PoseSink {
    fn on_pose(&mut self, rig_id: &str, frame: i32, pose: &Pose) -> Result<()>;

    /// Called once per rig when a run finishes.
    fn on_bounds(&mut self, _rig_id: &str, _range: FrameRange) -> Result<()> {
        Ok(())
    }
}

impl<S: PoseSink + ?Sized> PoseSink for &mut S {
    fn on_pose(&mut self, rig_id: &str, frame: i32, pose: &Pose) -> Result<()> {
        (**self).on_pose(rig_id, frame, pose)
    }

    fn on_bounds(&mut self, rig_id: &str, range: FrameRange) -> Result<()> {
        (**self).on_bounds(rig_id, range)
    }
}

/// A pose kept by the collecting sink.
#[derive(Clone, Debug, PartialEq)]
pub struct PosedFrame {
    pub rig_id: String,
    pub frame: i32,
    pub pose: Pose,
}

/// Collects every pose in arrival order.
impl PoseSink for Vec<PosedFrame> {
    fn on_pose(&mut self, rig_id: &str, frame: i32, pose: &Pose) -> Result<()> {
        self.push(PosedFrame {
            rig_id: rig_id.to_string(),
            frame,
            pose: pose.clone(),
        });
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedFrame {
    pub rig_id: String,
    pub frame: i32,
    pub error: PoseError,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProcessReport {
    pub forwarded: usize,
    pub skipped: Vec<SkippedFrame>,
}

impl ProcessReport {
    pub fn merge(&mut self, other: ProcessReport) {
        self.forwarded += other.forwarded;
        self.skipped.extend(other.skipped);
    }
}

/// Drives frames for any number of rigs through one rest pose.
#[derive(Debug)]
pub struct FrameProcessor<'a> {
    rest: &'a RestPose,
    bounds: FrameBounds,
    last_forwarded: HashMap<String, i32>,
    report: ProcessReport,
}

impl<'a> FrameProcessor<'a> {
    pub fn new(rest: &'a RestPose) -> Self {
        Self {
            rest,
            bounds: FrameBounds::new(),
            last_forwarded: HashMap::new(),
            report: ProcessReport::default(),
        }
    }

    fn pose_frame(&self, frame: &FrameData) -> Result<Pose> {
        if let Some(&previous) = self.last_forwarded.get(&frame.rig_id) {
            if frame.frame < previous {
                return Err(PoseError::OutOfOrderFrame {
                    previous,
                    frame: frame.frame,
                });
            }
        }
        let cfg = self.rest.config();
        if cfg.validate_frames {
            validate_frame(frame, &cfg.limits)?;
        }
        self.rest.apply_frame(frame)
    }

    /// Process one frame. Returns whether it reached the sink.
    pub fn process<S>(&mut self, frame: &FrameData, sink: &mut S) -> bool
    where
        S: PoseSink + ?Sized,
    {
        self.bounds.observe(&frame.rig_id, frame.frame);

        let result = self
            .pose_frame(frame)
            .and_then(|pose| sink.on_pose(&frame.rig_id, frame.frame, &pose));

        match result {
            Ok(()) => {
                self.last_forwarded.insert(frame.rig_id.clone(), frame.frame);
                self.report.forwarded += 1;
                trace!(rig_id = %frame.rig_id, frame = frame.frame, "pose forwarded");
                true
            }
            Err(error) => {
                warn!(
                    rig_id = %frame.rig_id,
                    frame = frame.frame,
                    category = error.category(),
                    %error,
                    "skipping frame"
                );
                self.report.skipped.push(SkippedFrame {
                    rig_id: frame.rig_id.clone(),
                    frame: frame.frame,
                    error,
                });
                false
            }
        }
    }

    /// Process every frame in stream order.
    pub fn run<I, F, S>(&mut self, frames: I, sink: &mut S)
    where
        I: IntoIterator<Item = F>,
        F: Borrow<FrameData>,
        S: PoseSink + ?Sized,
    {
        for frame in frames {
            self.process(frame.borrow(), sink);
        }
    }

    #[inline]
    pub fn bounds(&self) -> &FrameBounds {
        &self.bounds
    }

    #[inline]
    pub fn report(&self) -> &ProcessReport {
        &self.report
    }

    /// Report per-rig bounds to the sink and hand back the run summary.
    pub fn finish<S>(self, sink: &mut S) -> (ProcessReport, FrameBounds)
    where
        S: PoseSink + ?Sized,
    {
        for (rig_id, range) in self.bounds.rigs() {
            if let Err(error) = sink.on_bounds(rig_id, range) {
                warn!(rig_id, %error, "sink rejected frame bounds");
            }
        }
        (self.report, self.bounds)
    }
}

/// Result of processing one rig in [`run_partitioned`].
#[derive(Debug)]
pub struct RigRun<S> {
    pub rig_id: String,
    pub sink: S,
    pub report: ProcessReport,
    pub range: Option<FrameRange>,
}

/// Process each rig on its own scoped thread with its own sink.
///
/// Frames are grouped by rig and stably sorted by frame number, so every sink sees
/// its rig's frames in non-decreasing order. Results come back sorted by rig id.
pub fn run_partitioned<F, S>(rest: &RestPose, frames: Vec<FrameData>, make_sink: F) -> Vec<RigRun<S>>
where
    F: Fn(&str) -> S + Sync,
    S: PoseSink + Send,
{
    let mut groups: BTreeMap<String, Vec<FrameData>> = BTreeMap::new();
    for frame in frames {
        groups.entry(frame.rig_id.clone()).or_default().push(frame);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|f| f.frame);
    }

    let make_sink = &make_sink;
    std::thread::scope(|scope| {
        let handles: Vec<_> = groups
            .into_iter()
            .map(|(rig_id, frames)| {
                scope.spawn(move || {
                    let mut sink = make_sink(&rig_id);
                    let mut processor = FrameProcessor::new(rest);
                    processor.run(&frames, &mut sink);
                    let (report, bounds) = processor.finish(&mut sink);
                    let range = bounds.get(&rig_id);
                    RigRun {
                        rig_id,
                        sink,
                        report,
                        range,
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(run) => run,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
