//! Read-only input tree consumed by the transducer.
//!
//! Nodes live in an arena owned by [`Dom`] and are addressed by [`NodeId`].
//! Any HTML parser can build this structure; the tree is never modified
//! while it is being converted, so one `Dom` can be converted any number of
//! times.

/// Index of a node inside a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The tree root.
    Document,
    /// An element with a lowercase tag name.
    Element { tag: String },
    /// Character data.
    Text(String),
    /// Comments, doctypes and anything else without rendered content.
    Other,
}

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<NodeEntry>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a tree holding only the document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeEntry {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Id of the document root.
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow the document root.
    pub fn root(&self) -> NodeRef<'_> {
        self.get(self.root_id())
    }

    /// Borrow any node by id.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this tree.
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.nodes.len(), "node id out of range");
        NodeRef { dom: self, id }
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Append an element under `parent`. The tag name is lowercased.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(
            parent,
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
            },
        )
    }

    /// Append a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push(parent, NodeData::Text(text.into()))
    }

    /// Append a node with no rendered content (comment, doctype).
    pub fn append_other(&mut self, parent: NodeId) -> NodeId {
        self.push(parent, NodeData::Other)
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

/// Borrowed handle to one node of a [`Dom`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    dom: &'a Dom,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn data(&self) -> &'a NodeData {
        &self.dom.nodes[self.id.0].data
    }

    /// Tag name for element nodes.
    pub fn tag(&self) -> Option<&'a str> {
        match self.data() {
            NodeData::Element { tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let dom = self.dom;
        dom.nodes[self.id.0].parent.map(|id| NodeRef { dom, id })
    }

    /// Children in document order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let dom = self.dom;
        dom.nodes[self.id.0]
            .children
            .iter()
            .map(move |&id| NodeRef { dom, id })
    }

    /// Siblings that come before this node, nearest last.
    pub fn preceding_siblings(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let id = self.id;
        self.parent()
            .into_iter()
            .flat_map(|parent| parent.children())
            .take_while(move |sibling| sibling.id != id)
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self.data() {
            NodeData::Text(text) => text.clone(),
            _ => self.children().map(|child| child.text_content()).collect(),
        }
    }
}
