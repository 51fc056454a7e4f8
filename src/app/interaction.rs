use tuirealm::ratatui::layout::Rect;

use super::messages::Message;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionLayer {
    Base,
    Overlay,
    Dialog,
}

impl InteractionLayer {
    fn priority(self) -> u8 {
        match self {
            Self::Base => 0,
            Self::Overlay => 1,
            Self::Dialog => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionKind {
    Hover,
    LeftClick,
    Press,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InteractionNode {
    pub rect: Rect,
    pub message: Message,
    pub layer: InteractionLayer,
    pub hoverable: bool,
    pub clickable: bool,
    /// Pressing starts a pointer gesture instead of an immediate click.
    pub draggable: bool,
}

impl InteractionNode {
    pub fn click(layer: InteractionLayer, rect: Rect, message: Message) -> Self {
        Self {
            rect,
            message,
            layer,
            hoverable: true,
            clickable: true,
            draggable: false,
        }
    }

    pub fn card(layer: InteractionLayer, rect: Rect, message: Message) -> Self {
        Self {
            rect,
            message,
            layer,
            hoverable: true,
            clickable: false,
            draggable: true,
        }
    }

    fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.rect.x
            && col < self.rect.x.saturating_add(self.rect.width)
            && row >= self.rect.y
            && row < self.rect.y.saturating_add(self.rect.height)
    }

    fn supports(&self, kind: InteractionKind) -> bool {
        match kind {
            InteractionKind::Hover => self.hoverable,
            InteractionKind::LeftClick => self.clickable,
            InteractionKind::Press => self.clickable || self.draggable,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InteractionMap {
    nodes: Vec<InteractionNode>,
}

impl InteractionMap {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn register(&mut self, node: InteractionNode) {
        self.nodes.push(node);
    }

    pub fn register_click(&mut self, layer: InteractionLayer, rect: Rect, message: Message) {
        self.register(InteractionNode::click(layer, rect, message));
    }

    pub fn register_card(&mut self, layer: InteractionLayer, rect: Rect, message: Message) {
        self.register(InteractionNode::card(layer, rect, message));
    }

    pub fn resolve_message(&self, col: u16, row: u16, kind: InteractionKind) -> Option<Message> {
        self.resolve_node(col, row, kind)
            .map(|node| node.message.clone())
    }

    /// Topmost node under the pointer: higher layers win, then later
    /// registrations within a layer.
    pub fn resolve_node(
        &self,
        col: u16,
        row: u16,
        kind: InteractionKind,
    ) -> Option<&InteractionNode> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.contains(col, row) && node.supports(kind))
            .max_by_key(|(idx, node)| (node.layer.priority(), *idx))
            .map(|(_, node)| node)
    }

    /// Whether anything above the base layer is registered at the point.
    pub fn blocks_base(&self, col: u16, row: u16) -> bool {
        self.nodes
            .iter()
            .any(|node| node.layer != InteractionLayer::Base && node.contains(col, row))
    }
}
