//! Actor projection.
//!
//! A minimal read-only snapshot of playable characters, populated once per
//! session from the handshake and consumed by the native fallback view. It is
//! never synchronized with the embedded context.

/// Stable actor key.
pub type ActorId = String;

/// A named numeric attribute (e.g. "Strength 14").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorAttribute {
    /// Display label.
    pub label: String,
    /// Current value.
    pub value: i32,
    /// Optional upper bound.
    pub max: Option<i32>,
}

impl ActorAttribute {
    /// Create an attribute without an upper bound.
    pub fn new(label: impl Into<String>, value: i32) -> Self {
        Self { label: label.into(), value, max: None }
    }
}

/// A depletable pool (hit points, spell slots, ...).
///
/// `0 <= current <= max` holds for every value constructed or updated through
/// this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorResource {
    label: String,
    current: i32,
    max: i32,
}

impl ActorResource {
    /// Create a resource, clamping `current` into `0..=max`.
    ///
    /// A negative `max` is treated as zero.
    pub fn new(label: impl Into<String>, current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self { label: label.into(), current: current.clamp(0, max), max }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current value.
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Upper bound.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Set the current value, clamped into `0..=max`. Returns the stored value.
    pub fn set_current(&mut self, value: i32) -> i32 {
        self.current = value.clamp(0, self.max);
        self.current
    }
}

/// A playable character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Unique key within a roster.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Free-form classification, e.g. "PC".
    pub kind: String,
    /// Ordered attributes.
    pub attributes: Vec<ActorAttribute>,
    /// Ordered resource pools.
    pub resources: Vec<ActorResource>,
}

impl Actor {
    /// Create an actor with no attributes or resources.
    pub fn new(id: impl Into<ActorId>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            attributes: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: ActorAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Append a resource.
    #[must_use]
    pub fn with_resource(mut self, resource: ActorResource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Look up a resource by label.
    pub fn resource(&self, label: &str) -> Option<&ActorResource> {
        self.resources.iter().find(|r| r.label == label)
    }

    pub(crate) fn resource_mut(&mut self, label: &str) -> Option<&mut ActorResource> {
        self.resources.iter_mut().find(|r| r.label == label)
    }
}
