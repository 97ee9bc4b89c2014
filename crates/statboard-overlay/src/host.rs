//! The surface hover tooltips are mounted into.

use parking_lot::Mutex;
use statboard_geometry::{Point, Size};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(pub u64);

/// A document-like surface that can hold free-floating overlay nodes outside
/// the normal layout flow.
///
/// A freshly mounted node is invisible until [`reveal`](Self::reveal) is
/// called, but it is already laid out so that [`measure`](Self::measure)
/// reports its real size.
pub trait OverlayHost {
    fn viewport(&self) -> Size;
    /// Insert `markup` as a new detached node. The markup is trusted.
    fn mount(&mut self, markup: &str) -> NodeHandle;
    fn measure(&self, node: NodeHandle) -> Size;
    fn place(&mut self, node: NodeHandle, at: Point);
    fn reveal(&mut self, node: NodeHandle);
    fn unmount(&mut self, node: NodeHandle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct MountedNode {
    pub markup: String,
    pub position: Option<Point>,
    pub visible: bool,
}

#[derive(Debug, Default)]
struct Document {
    viewport: Size,
    plate: Size,
    next_id: u64,
    nodes: BTreeMap<NodeHandle, MountedNode>,
    mutations: usize,
}

/// In-memory host. Clones share one document, so a caller can keep a handle
/// to inspect what a detector mounted.
///
/// Every mounted node measures as the same plate size.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    doc: Arc<Mutex<Document>>,
}

impl MemoryHost {
    pub fn new(viewport: Size, plate: Size) -> Self {
        Self {
            doc: Arc::new(Mutex::new(Document {
                viewport,
                plate,
                ..Document::default()
            })),
        }
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.doc.lock().viewport = viewport;
    }

    pub fn attached_count(&self) -> usize {
        self.doc.lock().nodes.len()
    }

    /// Total number of mount, place, reveal and unmount operations so far.
    pub fn mutation_count(&self) -> usize {
        self.doc.lock().mutations
    }

    pub fn node(&self, handle: NodeHandle) -> Option<MountedNode> {
        self.doc.lock().nodes.get(&handle).cloned()
    }

    pub fn nodes(&self) -> Vec<(NodeHandle, MountedNode)> {
        self.doc
            .lock()
            .nodes
            .iter()
            .map(|(handle, node)| (*handle, node.clone()))
            .collect()
    }
}

impl OverlayHost for MemoryHost {
    fn viewport(&self) -> Size {
        self.doc.lock().viewport
    }

    fn mount(&mut self, markup: &str) -> NodeHandle {
        let mut doc = self.doc.lock();
        doc.next_id += 1;
        let handle = NodeHandle(doc.next_id);
        doc.nodes.insert(
            handle,
            MountedNode {
                markup: markup.to_string(),
                position: None,
                visible: false,
            },
        );
        doc.mutations += 1;
        handle
    }

    fn measure(&self, node: NodeHandle) -> Size {
        let doc = self.doc.lock();
        if doc.nodes.contains_key(&node) {
            doc.plate
        } else {
            Size::default()
        }
    }

    fn place(&mut self, node: NodeHandle, at: Point) {
        let mut guard = self.doc.lock();
        let doc = &mut *guard;
        if let Some(mounted) = doc.nodes.get_mut(&node) {
            mounted.position = Some(at);
            doc.mutations += 1;
        }
    }

    fn reveal(&mut self, node: NodeHandle) {
        let mut guard = self.doc.lock();
        let doc = &mut *guard;
        if let Some(mounted) = doc.nodes.get_mut(&node) {
            mounted.visible = true;
            doc.mutations += 1;
        }
    }

    fn unmount(&mut self, node: NodeHandle) {
        let mut doc = self.doc.lock();
        if doc.nodes.remove(&node).is_some() {
            doc.mutations += 1;
        }
    }
}
