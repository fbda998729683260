use crate::error::{RibwireError, RibwireResult};

/// Per-element payload type of a parameter, mirroring the renderer-side
/// declaration types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ElementType {
    Float,
    Point,
    Vector,
    Normal,
    Color,
    HPoint,
    String,
}

impl ElementType {
    /// Floats per element. Zero for string payloads.
    pub fn float_width(self) -> usize {
        match self {
            Self::Float => 1,
            Self::Point | Self::Vector | Self::Normal | Self::Color => 3,
            Self::HPoint => 4,
            Self::String => 0,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Point => "point",
            Self::Vector => "vector",
            Self::Normal => "normal",
            Self::Color => "color",
            Self::HPoint => "hpoint",
            Self::String => "string",
        }
    }
}

/// How a parameter varies across a primitive (the renderer's detail class).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DetailClass {
    Uniform,
    Varying,
    Vertex,
    Constant,
    FaceVarying,
    FaceVertex,
}

impl DetailClass {
    pub fn detail_name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Varying => "varying",
            Self::Vertex => "vertex",
            Self::Constant => "constant",
            Self::FaceVarying => "facevarying",
            Self::FaceVertex => "facevertex",
        }
    }
}

/// Owned slot payload. Clone is a deep copy; slots never alias buffers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SlotData {
    Floats(Vec<f32>),
    Text(String),
}

/// A named, typed, variable-length buffer for one attribute of one object
/// snapshot.
///
/// The float buffer is grow-only: `configure` re-allocates when the new
/// requirement exceeds current capacity and otherwise reuses the existing
/// allocation, so shrinking the element count never discards data already
/// written below the new count.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterSlot {
    name: String,
    element_type: ElementType,
    detail: DetailClass,
    element_count: usize,
    data: SlotData,
}

impl ParameterSlot {
    pub fn new(
        name: impl Into<String>,
        element_type: ElementType,
        detail: DetailClass,
    ) -> Self {
        let data = match element_type {
            ElementType::String => SlotData::Text(String::new()),
            _ => SlotData::Floats(Vec::new()),
        };
        Self {
            name: name.into(),
            element_type,
            detail,
            element_count: 0,
            data,
        }
    }

    /// Creates a slot and sizes its buffer for `count` elements in one step.
    pub fn with_count(
        name: impl Into<String>,
        element_type: ElementType,
        detail: DetailClass,
        count: usize,
    ) -> RibwireResult<Self> {
        let mut slot = Self::new(name, element_type, detail);
        slot.element_count = count;
        slot.ensure_capacity()?;
        Ok(slot)
    }

    /// (Re)configures the slot and ensures the buffer can hold `count`
    /// elements of `element_type`.
    ///
    /// Growth failure propagates as `Allocation`; the buffer is never
    /// silently truncated.
    pub fn configure(
        &mut self,
        name: impl Into<String>,
        element_type: ElementType,
        detail: DetailClass,
        count: usize,
    ) -> RibwireResult<()> {
        self.name = name.into();
        self.detail = detail;

        let switching_repr = matches!(self.data, SlotData::Text(_))
            != matches!(element_type, ElementType::String);
        if switching_repr {
            self.data = match element_type {
                ElementType::String => SlotData::Text(String::new()),
                _ => SlotData::Floats(Vec::new()),
            };
        }
        self.element_type = element_type;
        self.element_count = count;
        self.ensure_capacity()
    }

    fn ensure_capacity(&mut self) -> RibwireResult<()> {
        let required = self.element_count * self.element_type.float_width();
        if let SlotData::Floats(buf) = &mut self.data
            && required > buf.len()
        {
            let grow = required - buf.len();
            buf.try_reserve(grow).map_err(|_| {
                RibwireError::allocation(format!(
                    "cannot grow slot '{}' to {required} floats",
                    self.name
                ))
            })?;
            buf.resize(required, 0.0);
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn detail(&self) -> DetailClass {
        self.detail
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// The float payload, exactly `element_count × float_width` long.
    /// Spare capacity kept by the grow-only policy is not exposed.
    pub fn floats(&self) -> &[f32] {
        match &self.data {
            SlotData::Floats(buf) => {
                let len = self.element_count * self.element_type.float_width();
                &buf[..len.min(buf.len())]
            }
            SlotData::Text(_) => &[],
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.data {
            SlotData::Text(s) => Some(s.as_str()),
            SlotData::Floats(_) => None,
        }
    }

    /// Checked single-float write. Slot must be `Float`-typed.
    pub fn set_float(&mut self, index: usize, value: f32) -> RibwireResult<()> {
        self.checked_write(index, &[value])
    }

    /// Checked three-float write (point/vector/normal/color slots).
    pub fn set_triple(&mut self, index: usize, value: [f32; 3]) -> RibwireResult<()> {
        self.checked_write(index, &value)
    }

    /// Checked four-float write (hpoint slots).
    pub fn set_quad(&mut self, index: usize, value: [f32; 4]) -> RibwireResult<()> {
        self.checked_write(index, &value)
    }

    /// Unchecked-in-release single-float write for hot export loops.
    /// Callers guarantee `index < element_count` and a `Float` slot.
    pub fn write_float(&mut self, index: usize, value: f32) {
        debug_assert_eq!(self.element_type.float_width(), 1);
        debug_assert!(index < self.element_count);
        if let SlotData::Floats(buf) = &mut self.data {
            buf[index] = value;
        }
    }

    /// Unchecked-in-release triple write for hot export loops.
    pub fn write_triple(&mut self, index: usize, value: [f32; 3]) {
        debug_assert_eq!(self.element_type.float_width(), 3);
        debug_assert!(index < self.element_count);
        if let SlotData::Floats(buf) = &mut self.data {
            buf[index * 3..index * 3 + 3].copy_from_slice(&value);
        }
    }

    /// Unchecked-in-release quad write for hot export loops.
    pub fn write_quad(&mut self, index: usize, value: [f32; 4]) {
        debug_assert_eq!(self.element_type.float_width(), 4);
        debug_assert!(index < self.element_count);
        if let SlotData::Floats(buf) = &mut self.data {
            buf[index * 4..index * 4 + 4].copy_from_slice(&value);
        }
    }

    /// Replaces the string payload. Only valid on `String`-typed slots.
    pub fn set_string(&mut self, value: impl Into<String>) -> RibwireResult<()> {
        match &mut self.data {
            SlotData::Text(s) => {
                *s = value.into();
                Ok(())
            }
            SlotData::Floats(_) => Err(RibwireError::validation(format!(
                "slot '{}' is not string-typed",
                self.name
            ))),
        }
    }

    /// True iff this slot is the legacy default texture-coordinate set:
    /// named "st" and not facevarying. Preserved verbatim from the original
    /// exporter; render-farm compatibility depends on it.
    pub fn is_default_texture_coordinate(&self) -> bool {
        self.name == "st" && self.detail != DetailClass::FaceVarying
    }

    fn checked_write(&mut self, index: usize, values: &[f32]) -> RibwireResult<()> {
        let width = self.element_type.float_width();
        if width != values.len() {
            return Err(RibwireError::validation(format!(
                "slot '{}' expects {width} floats per element, got {}",
                self.name,
                values.len()
            )));
        }
        if index >= self.element_count {
            return Err(RibwireError::validation(format!(
                "index {index} out of bounds for slot '{}' (count {})",
                self.name, self.element_count
            )));
        }
        if let SlotData::Floats(buf) = &mut self.data {
            buf[index * width..index * width + width].copy_from_slice(values);
        }
        Ok(())
    }
}

/// Borrowed view of one slot, the shape consumed by emitter adapters.
#[derive(Clone, Copy, Debug)]
pub struct SlotView<'a> {
    pub name: &'a str,
    pub element_type: ElementType,
    pub detail: DetailClass,
    pub element_count: usize,
    pub values: SlotValues<'a>,
}

#[derive(Clone, Copy, Debug)]
pub enum SlotValues<'a> {
    Floats(&'a [f32]),
    Text(&'a str),
}

/// Ordered collection of slots for one object snapshot. Insertion order is
/// preserved; it is later zipped with declarations for the emission call.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterSet {
    slots: Vec<ParameterSlot>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot names must be unique within a set; `get` resolves the first
    /// match, so a duplicate would shadow the original on lookup while
    /// still being emitted twice.
    pub fn append(&mut self, slot: ParameterSlot) {
        debug_assert!(
            self.get(slot.name()).is_none(),
            "duplicate slot name '{}'",
            slot.name()
        );
        self.slots.push(slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSlot> {
        self.slots.iter().find(|s| s.name() == name)
    }

    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    /// Slot views in insertion order. Restartable; call again for a fresh
    /// pass.
    pub fn iter(&self) -> impl Iterator<Item = SlotView<'_>> {
        self.slots.iter().map(|slot| SlotView {
            name: slot.name(),
            element_type: slot.element_type(),
            detail: slot.detail(),
            element_count: slot.element_count(),
            values: match slot.text() {
                Some(s) => SlotValues::Text(s),
                None => SlotValues::Floats(slot.floats()),
            },
        })
    }
}
