//! The output-collaborator seam: declaration strings, string escaping, and
//! the [`Emitter`] trait the exporter drives. Implementations own the wire
//! format; the core never writes files itself.

use std::fmt::Write as _;

use crate::{
    error::{RibwireError, RibwireResult},
    param::{DetailClass, ElementType, SlotValues, SlotView},
    registry::ObjectIdentity,
    snapshot::ObjectKind,
};

/// The renderer-side declaration string for a slot, e.g. `"vertex point"`
/// or `"facevarying float"`. This table must match what renderers already
/// accept; do not normalize it.
pub fn declaration_for(element_type: ElementType, detail: DetailClass) -> String {
    format!("{} {}", detail.detail_name(), element_type.type_name())
}

/// Escapes backslashes and double quotes for quoted string payloads
/// (Windows paths in shader parameters being the classic case).
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Receives one object's worth of emission calls from the exporter.
pub trait Emitter {
    fn begin_object(&mut self, identity: &ObjectIdentity, kind: ObjectKind)
    -> RibwireResult<()>;

    /// Opens a motion block covering `sample_count` samples. The exporter
    /// emits every sample's parameters between this and `motion_end`.
    fn motion_begin(&mut self, sample_count: usize) -> RibwireResult<()>;

    fn motion_end(&mut self) -> RibwireResult<()>;

    /// One parameter, with its declaration already resolved (UV re-typing
    /// included) by the exporter.
    fn parameter(&mut self, declaration: &str, view: &SlotView<'_>) -> RibwireResult<()>;

    fn end_object(&mut self) -> RibwireResult<()>;
}

/// Legacy RIB ASCII framing, written into an in-memory string. Used by the
/// CLI `dump` subcommand and fixture tests; production hosts supply their
/// own [`Emitter`].
pub struct RibAsciiEmitter {
    out: String,
    escape_strings: bool,
    in_motion: bool,
}

impl RibAsciiEmitter {
    pub fn new(escape_strings: bool) -> Self {
        Self {
            out: String::new(),
            escape_strings,
            in_motion: false,
        }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    fn indent(&self) -> &'static str {
        if self.in_motion { "    " } else { "  " }
    }
}

impl Emitter for RibAsciiEmitter {
    fn begin_object(
        &mut self,
        identity: &ObjectIdentity,
        kind: ObjectKind,
    ) -> RibwireResult<()> {
        writeln!(self.out, "AttributeBegin")
            .and_then(|()| {
                writeln!(
                    self.out,
                    "  Attribute \"identifier\" \"name\" [\"{}\"] # {}",
                    escape_string(&identity.to_string()),
                    kind.kind_name()
                )
            })
            .map_err(fmt_err)
    }

    fn motion_begin(&mut self, sample_count: usize) -> RibwireResult<()> {
        // Sample ordinals, not shutter times; the host emitter maps these
        // onto the camera shutter.
        let ordinals: Vec<String> = (0..sample_count).map(|i| i.to_string()).collect();
        writeln!(self.out, "  MotionBegin [{}]", ordinals.join(" ")).map_err(fmt_err)?;
        self.in_motion = true;
        Ok(())
    }

    fn motion_end(&mut self) -> RibwireResult<()> {
        self.in_motion = false;
        writeln!(self.out, "  MotionEnd").map_err(fmt_err)
    }

    fn parameter(&mut self, declaration: &str, view: &SlotView<'_>) -> RibwireResult<()> {
        write!(self.out, "{}\"{} {}\" [", self.indent(), declaration, view.name)
            .map_err(fmt_err)?;
        match view.values {
            SlotValues::Floats(floats) => {
                for (i, v) in floats.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    write!(self.out, "{v}").map_err(fmt_err)?;
                }
            }
            SlotValues::Text(s) => {
                let escaped;
                let s = if self.escape_strings {
                    escaped = escape_string(s);
                    &escaped
                } else {
                    s
                };
                write!(self.out, "\"{s}\"").map_err(fmt_err)?;
            }
        }
        writeln!(self.out, "]").map_err(fmt_err)
    }

    fn end_object(&mut self) -> RibwireResult<()> {
        writeln!(self.out, "AttributeEnd").map_err(fmt_err)
    }
}

fn fmt_err(_: std::fmt::Error) -> RibwireError {
    RibwireError::serde("formatting RIB ASCII output failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_table_matches_renderer_vocabulary() {
        assert_eq!(
            declaration_for(ElementType::Point, DetailClass::Vertex),
            "vertex point"
        );
        assert_eq!(
            declaration_for(ElementType::Float, DetailClass::FaceVarying),
            "facevarying float"
        );
        assert_eq!(
            declaration_for(ElementType::String, DetailClass::Constant),
            "constant string"
        );
        assert_eq!(
            declaration_for(ElementType::HPoint, DetailClass::Uniform),
            "uniform hpoint"
        );
        assert_eq!(
            declaration_for(ElementType::Normal, DetailClass::FaceVertex),
            "facevertex normal"
        );
        assert_eq!(
            declaration_for(ElementType::Color, DetailClass::Varying),
            "varying color"
        );
    }

    #[test]
    fn escaping_doubles_backslashes_and_quotes() {
        assert_eq!(escape_string(r"C:\maps\wood.tex"), r"C:\\maps\\wood.tex");
        assert_eq!(escape_string("a \"b\""), "a \\\"b\\\"");
        assert_eq!(escape_string("plain"), "plain");
    }

    #[test]
    fn ascii_emitter_frames_an_object() {
        let mut em = RibAsciiEmitter::new(true);
        let id = ObjectIdentity::path("|geo|quad");
        em.begin_object(&id, ObjectKind::Mesh).unwrap();
        em.parameter(
            "vertex point",
            &SlotView {
                name: "P",
                element_type: ElementType::Point,
                detail: DetailClass::Vertex,
                element_count: 1,
                values: SlotValues::Floats(&[0.0, 1.0, 2.0]),
            },
        )
        .unwrap();
        em.end_object().unwrap();

        let out = em.into_string();
        assert!(out.starts_with("AttributeBegin\n"));
        assert!(out.contains("\"vertex point P\" [0 1 2]"));
        assert!(out.ends_with("AttributeEnd\n"));
    }

    #[test]
    fn motion_block_indents_samples() {
        let mut em = RibAsciiEmitter::new(false);
        em.motion_begin(2).unwrap();
        em.parameter(
            "constant float",
            &SlotView {
                name: "width",
                element_type: ElementType::Float,
                detail: DetailClass::Constant,
                element_count: 1,
                values: SlotValues::Floats(&[0.5]),
            },
        )
        .unwrap();
        em.motion_end().unwrap();
        let out = em.into_string();
        assert!(out.contains("MotionBegin [0 1]"));
        assert!(out.contains("    \"constant float width\" [0.5]"));
        assert!(out.contains("MotionEnd"));
    }
}
