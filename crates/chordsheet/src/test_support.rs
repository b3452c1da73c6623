//! Test support utilities for chordsheet.
//!
//! This module provides a renderer that records every call, which is useful
//! for testing layout decisions, but is not part of the public API.

use std::convert::Infallible;

use crate::{
    ChordDefinition, FontSlot, FontSpec, Line, PageGeometry, Point, Renderer, TextStyle, Transform,
};

#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    BeginDocument(String),
    EndDocument(u32),
    BeginPhysicalPage(u32),
    EndPhysicalPage(u32),
    Transform(Transform),
    ResetTransform,
    MoveTo {
        h: f64,
        v: f64,
    },
    Text {
        text: String,
        slot: FontSlot,
        font: FontSpec,
        style: TextStyle,
    },
    Chords(Line),
    Stroke(Vec<Point>),
    Grid {
        name: String,
        label: Option<String>,
        stub: bool,
    },
}

/// A renderer that keeps a log of the calls it received.
#[derive(Default)]
pub struct RecordingRenderer {
    pub ops: Vec<RenderOp>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text shown, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every chord row shown, in order.
    pub fn chord_lines(&self) -> Vec<&Line> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::Chords(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    /// Names of the chord grids drawn, in order.
    pub fn grids(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::Grid { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&RenderOp) -> bool) -> usize {
        self.ops.iter().filter(|op| matches(op)).count()
    }

    /// The last point moved to before the text `wanted` was shown.
    pub fn position_of(&self, wanted: &str) -> Option<(f64, f64)> {
        let mut at = None;
        for op in &self.ops {
            match op {
                RenderOp::MoveTo { h, v } => at = Some((*h, *v)),
                RenderOp::Text { text, .. } if text == wanted => return at,
                _ => {}
            }
        }
        None
    }
}

impl Renderer for RecordingRenderer {
    type Error = Infallible;

    fn begin_document(&mut self, geometry: &PageGeometry) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::BeginDocument(geometry.name.clone()));
        Ok(())
    }

    fn end_document(&mut self, sheets: u32) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::EndDocument(sheets));
        Ok(())
    }

    fn begin_physical_page(&mut self, index: u32) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::BeginPhysicalPage(index));
        Ok(())
    }

    fn end_physical_page(&mut self, index: u32) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::EndPhysicalPage(index));
        Ok(())
    }

    fn apply_transform(&mut self, transform: &Transform) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::Transform(*transform));
        Ok(())
    }

    fn reset_transform(&mut self) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::ResetTransform);
        Ok(())
    }

    fn move_to(&mut self, h: f64, v: f64) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::MoveTo { h, v });
        Ok(())
    }

    fn show_text(
        &mut self,
        text: &str,
        slot: FontSlot,
        font: &FontSpec,
        style: TextStyle,
    ) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::Text {
            text: text.to_string(),
            slot,
            font: font.clone(),
            style,
        });
        Ok(())
    }

    fn show_chords(
        &mut self,
        line: &Line,
        _text_font: &FontSpec,
        _chord_font: &FontSpec,
    ) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::Chords(line.clone()));
        Ok(())
    }

    fn stroke_line(&mut self, points: &[Point], _width: f64) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::Stroke(points.to_vec()));
        Ok(())
    }

    fn draw_chord_grid(
        &mut self,
        chord: &ChordDefinition,
        origin_label: Option<&str>,
        _font: &FontSpec,
        _grid_size: f64,
    ) -> Result<(), Self::Error> {
        self.ops.push(RenderOp::Grid {
            name: chord.name.clone(),
            label: origin_label.map(str::to_string),
            stub: chord.is_stub(),
        });
        Ok(())
    }
}
