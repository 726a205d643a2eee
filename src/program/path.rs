/// Winding rule the geometry engine uses to decide path inclusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    /// Whether a face with this winding number lies inside the path.
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::EvenOdd => winding % 2 != 0,
        }
    }
}

/// Opaque reference to a path owned by the geometry engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RenderPath {
    pub id: u32,
    #[serde(default)]
    pub fill_rule: FillRule,
}

impl RenderPath {
    pub fn new(id: u32, fill_rule: FillRule) -> Self {
        Self { id, fill_rule }
    }
}
