use serde::{Deserialize, Serialize};

use crate::SharedStr;

/// One record of the size-annotated tree fed to icicle/sunburst renderers.
///
/// Field names are the wire format expected by existing front ends; the two
/// per-call fields are camel-cased there, everything else is snake-cased.
///
/// Invariant (established by the builder, not by this type): when `children`
/// is present, the children's `size` values sum to this record's `size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedNode {
    pub name: SharedStr,
    pub filename: SharedStr,
    pub directory: SharedStr,
    /// Primitive calls (not counting recursion).
    pub calls: u64,
    /// Total calls, recursion included.
    pub recursive: u64,
    pub local: f64,
    #[serde(rename = "localPer")]
    pub local_per: f64,
    pub cumulative: f64,
    #[serde(rename = "cumulativePer")]
    pub cumulative_per: f64,
    /// Absent for synthetic group records, which have no source line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SizedNode>>,
}

impl SizedNode {
    /// Retained children, or an empty slice for leaves.
    pub fn children(&self) -> &[SizedNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Sum of the direct children's sizes.
    pub fn children_size(&self) -> f64 {
        self.children().iter().map(|c| c.size).sum()
    }

    /// Multiply the size of this record and of its whole subtree by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.size *= factor;
        if let Some(children) = self.children.as_mut() {
            for child in children {
                child.scale(factor);
            }
        }
    }

    /// Depth of the deepest record below this one (0 for a leaf).
    pub fn height(&self) -> usize {
        self.children()
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }
}
