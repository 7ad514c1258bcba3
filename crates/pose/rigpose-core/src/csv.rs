//! Head-position CSV output.
//!
//! One line per frame: `x,y,z` for every joint in joint order, comma-joined, no header.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use hashbrown::HashMap;
use tracing::debug;

use crate::bounds::FrameRange;
use crate::error::PoseError;
use crate::math::Vec3;
use crate::pose::Pose;
use crate::stream::PoseSink;
use crate::Result;

/// Render the head positions of `pose` as one CSV line (without newline).
pub fn format_line(pose: &Pose) -> String {
    let mut line = String::with_capacity(pose.len() * 3 * 12);
    for (i, bone) in pose.bones().iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        let h = bone.head_abs;
        // Writing into a String cannot fail.
        let _ = write!(line, "{},{},{}", h.x, h.y, h.z);
    }
    line
}

/// Parse a line written by [`format_line`] back into head positions.
pub fn parse_line(line: &str) -> Result<Vec<Vec3>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }
    let values = line
        .split(',')
        .map(|field| {
            field.trim().parse::<f64>().map_err(|e| PoseError::Serialization {
                reason: format!("invalid number '{}': {e}", field.trim()),
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() % 3 != 0 {
        return Err(PoseError::Serialization {
            reason: format!("expected a multiple of 3 values, got {}", values.len()),
        });
    }
    Ok(values
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

/// Writes every pose to a single writer, regardless of rig.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    #[inline]
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PoseSink for CsvSink<W> {
    fn on_pose(&mut self, _rig_id: &str, _frame: i32, pose: &Pose) -> Result<()> {
        writeln!(self.writer, "{}", format_line(pose))?;
        self.lines += 1;
        Ok(())
    }

    fn on_bounds(&mut self, _rig_id: &str, _range: FrameRange) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Appends each rig's poses to `<dir>/<rig_id>.txt`.
///
/// Files are opened lazily in append mode and kept open until the sink is dropped.
#[derive(Debug)]
pub struct CsvDirectorySink {
    dir: PathBuf,
    files: HashMap<String, BufWriter<File>>,
}

impl CsvDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: HashMap::new(),
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output file of `rig_id`. Rig ids must be plain file names; anything that
    /// could resolve outside `dir` is rejected.
    pub fn path_for(&self, rig_id: &str) -> Result<PathBuf> {
        let file_name = format!("{rig_id}.txt");
        let mut components = Path::new(&file_name).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain || rig_id.is_empty() || rig_id.contains(&['/', '\\', ':'][..]) {
            return Err(PoseError::Sink {
                reason: format!("rig id '{rig_id}' is not a valid file name"),
            });
        }
        Ok(self.dir.join(file_name))
    }

    fn writer(&mut self, rig_id: &str) -> Result<&mut BufWriter<File>> {
        if !self.files.contains_key(rig_id) {
            let path = self.path_for(rig_id)?;
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            debug!(rig_id, path = %path.display(), "opened csv output");
            self.files.insert(rig_id.to_string(), BufWriter::new(file));
        }
        self.files.get_mut(rig_id).ok_or_else(|| PoseError::Sink {
            reason: format!("no writer for rig '{rig_id}'"),
        })
    }

    pub fn flush(&mut self) -> Result<()> {
        for writer in self.files.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl PoseSink for CsvDirectorySink {
    fn on_pose(&mut self, rig_id: &str, _frame: i32, pose: &Pose) -> Result<()> {
        let line = format_line(pose);
        let writer = self.writer(rig_id)?;
        writeln!(writer, "{line}")?;
        Ok(())
    }

    fn on_bounds(&mut self, rig_id: &str, _range: FrameRange) -> Result<()> {
        if let Some(writer) = self.files.get_mut(rig_id) {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_line("").unwrap().is_empty());
        assert!(matches!(
            parse_line("1,2"),
            Err(PoseError::Serialization { .. })
        ));
        assert!(matches!(
            parse_line("1,two,3"),
            Err(PoseError::Serialization { .. })
        ));
        let heads = parse_line(" 1, 2.5 ,-3\n").unwrap();
        assert_eq!(heads, vec![Vec3::new(1.0, 2.5, -3.0)]);
    }

    #[test]
    fn rig_ids_cannot_escape_the_output_dir() {
        let sink = CsvDirectorySink::new("out");
        assert_eq!(sink.path_for("p1").unwrap(), Path::new("out").join("p1.txt"));
        for bad in ["../x", "/abs/x", "a/b", "a\\b", "", "C:x"] {
            assert!(
                matches!(sink.path_for(bad), Err(PoseError::Sink { .. })),
                "{bad}"
            );
        }
    }
}
