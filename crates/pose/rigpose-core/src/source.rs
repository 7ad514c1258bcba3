//! Rig data source contract.
//!
//! Rest-pose joints are enumerated with a cursor: ask for the joint after `previous`
//! (or the first joint when `previous` is `None`) until the source reports exhaustion.
//! Sources must emit a parent before any of its children.

use crate::catalog::{JointCatalog, JointDescriptor};
use crate::error::PoseError;
use crate::Result;

pub trait RigSource {
    /// The joint following `previous`, `Ok(None)` once exhausted.
    fn next_joint(&self, previous: Option<&str>) -> Result<Option<JointDescriptor>>;
}

fn next_in(joints: &[JointDescriptor], previous: Option<&str>) -> Result<Option<JointDescriptor>> {
    let index = match previous {
        None => 0,
        Some(name) => {
            let pos = joints
                .iter()
                .position(|j| j.name == name)
                .ok_or_else(|| PoseError::Source {
                    reason: format!("cursor joint '{name}' is not part of this source"),
                })?;
            pos + 1
        }
    };
    Ok(joints.get(index).cloned())
}

impl RigSource for JointCatalog {
    fn next_joint(&self, previous: Option<&str>) -> Result<Option<JointDescriptor>> {
        next_in(self.joints(), previous)
    }
}

/// Plain ordered list of descriptors, e.g. captured from an external rig library.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DescriptorList(pub Vec<JointDescriptor>);

impl RigSource for DescriptorList {
    fn next_joint(&self, previous: Option<&str>) -> Result<Option<JointDescriptor>> {
        next_in(&self.0, previous)
    }
}

impl From<Vec<JointDescriptor>> for DescriptorList {
    fn from(joints: Vec<JointDescriptor>) -> Self {
        Self(joints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_walks_catalog_in_order() {
        let catalog = JointCatalog::humanoid();
        let mut names = Vec::new();
        let mut cursor: Option<String> = None;
        while let Some(joint) = catalog.next_joint(cursor.as_deref()).unwrap() {
            names.push(joint.name.clone());
            cursor = Some(joint.name);
        }
        let expected: Vec<String> = catalog.joints().iter().map(|j| j.name.clone()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn unknown_cursor_is_a_source_error() {
        let list = DescriptorList(vec![JointDescriptor::new("root", "", 1.0)]);
        let err = list.next_joint(Some("missing")).unwrap_err();
        assert!(matches!(err, PoseError::Source { .. }));
        assert_eq!(list.next_joint(Some("root")).unwrap(), None);
    }
}
