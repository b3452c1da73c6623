//! Typeface slots and the linkage between them.
//!
//! Comment, italic comment and tab (mono) styles follow the lyrics text style
//! until they are set explicitly. Linkage is carried by [`SlotValue`]: a
//! `Linked` value is re-derived from the text slot, an `Overridden` value is
//! left alone forever after.
use std::fmt;

pub const DEFAULT_TEXT_FONT: &str = "Times-Roman";
pub const DEFAULT_CHORD_FONT: &str = "Helvetica-Oblique";
pub const DEFAULT_MONO_FONT: &str = "Courier";
pub const DEFAULT_TEXT_SIZE: i32 = 12;
pub const DEFAULT_CHORD_SIZE: i32 = 9;
/// Tab text is this many points smaller than lyrics while linked.
pub const MONO_SIZE_DECREMENT: i32 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontSlot {
    Text,
    Chord,
    Mono,
    Comment,
    CommentItalic,
}

impl FontSlot {
    pub const ALL: [FontSlot; 5] = [
        FontSlot::Text,
        FontSlot::Chord,
        FontSlot::Mono,
        FontSlot::Comment,
        FontSlot::CommentItalic,
    ];

    fn index(self) -> usize {
        match self {
            FontSlot::Text => 0,
            FontSlot::Chord => 1,
            FontSlot::Mono => 2,
            FontSlot::Comment => 3,
            FontSlot::CommentItalic => 4,
        }
    }

    /// Slots that track the text style until overridden.
    pub fn is_dependent(self) -> bool {
        matches!(
            self,
            FontSlot::Mono | FontSlot::Comment | FontSlot::CommentItalic
        )
    }
}

impl fmt::Display for FontSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FontSlot::Text => "text",
            FontSlot::Chord => "chord",
            FontSlot::Mono => "tab",
            FontSlot::Comment => "comment",
            FontSlot::CommentItalic => "comment_italic",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontSpec {
    pub family: String,
    pub size: i32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: i32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotValue {
    Linked(FontSpec),
    Overridden(FontSpec),
}

impl SlotValue {
    pub fn spec(&self) -> &FontSpec {
        match self {
            SlotValue::Linked(spec) | SlotValue::Overridden(spec) => spec,
        }
    }

    fn spec_mut(&mut self) -> &mut FontSpec {
        match self {
            SlotValue::Linked(spec) | SlotValue::Overridden(spec) => spec,
        }
    }
}

/// Whether a change targets the startup default or the value in effect.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Default,
    Current,
}

#[derive(Clone, Debug)]
struct Slot {
    default: FontSpec,
    current: SlotValue,
}

#[derive(Clone, Debug)]
pub struct StyleState {
    slots: [Slot; 5],
}

impl Default for StyleState {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleState {
    pub fn new() -> Self {
        let text = FontSpec::new(DEFAULT_TEXT_FONT, DEFAULT_TEXT_SIZE);
        let chord = FontSpec::new(DEFAULT_CHORD_FONT, DEFAULT_CHORD_SIZE);
        let mono = FontSpec::new(DEFAULT_MONO_FONT, DEFAULT_TEXT_SIZE - MONO_SIZE_DECREMENT);
        let comment = FontSpec::new(DEFAULT_TEXT_FONT, DEFAULT_TEXT_SIZE);
        let italic = FontSpec::new(DEFAULT_CHORD_FONT, DEFAULT_TEXT_SIZE);
        Self {
            slots: [
                Slot {
                    current: SlotValue::Overridden(text.clone()),
                    default: text,
                },
                Slot {
                    current: SlotValue::Overridden(chord.clone()),
                    default: chord,
                },
                Slot {
                    current: SlotValue::Linked(mono.clone()),
                    default: mono,
                },
                Slot {
                    current: SlotValue::Linked(comment.clone()),
                    default: comment,
                },
                Slot {
                    current: SlotValue::Linked(italic.clone()),
                    default: italic,
                },
            ],
        }
    }

    pub fn current(&self, slot: FontSlot) -> &FontSpec {
        self.slots[slot.index()].current.spec()
    }

    pub fn default_of(&self, slot: FontSlot) -> &FontSpec {
        &self.slots[slot.index()].default
    }

    pub fn value(&self, slot: FontSlot) -> &SlotValue {
        &self.slots[slot.index()].current
    }

    pub fn is_linked(&self, slot: FontSlot) -> bool {
        matches!(self.value(slot), SlotValue::Linked(_))
    }

    pub fn set_font(&mut self, slot: FontSlot, family: &str, scope: Scope, extensions: bool) {
        match scope {
            Scope::Default => {
                self.slots[slot.index()].default.family = family.to_string();
                self.unlink_to_default(slot);
            }
            Scope::Current => {
                let mut spec = self.current(slot).clone();
                spec.family = family.to_string();
                self.slots[slot.index()].current = SlotValue::Overridden(spec);
                self.after_change(slot, extensions);
            }
        }
    }

    pub fn set_size(&mut self, slot: FontSlot, size: i32, scope: Scope, extensions: bool) {
        match scope {
            Scope::Default => {
                self.slots[slot.index()].default.size = size;
                self.unlink_to_default(slot);
            }
            Scope::Current => {
                let mut spec = self.current(slot).clone();
                spec.size = size;
                self.slots[slot.index()].current = SlotValue::Overridden(spec);
                self.after_change(slot, extensions);
            }
        }
    }

    /// Relative size change; returns the new size.
    /// Returns `None` and leaves the slot alone when the result is not a
    /// positive size.
    pub fn adjust_size(
        &mut self,
        slot: FontSlot,
        delta: i32,
        scope: Scope,
        extensions: bool,
    ) -> Option<i32> {
        let base = match scope {
            Scope::Default => self.default_of(slot).size,
            Scope::Current => self.current(slot).size,
        };
        let size = base.checked_add(delta).filter(|s| *s > 0)?;
        self.set_size(slot, size, scope, extensions);
        Some(size)
    }

    /// Restore every slot to its default at the start of a song unit.
    pub fn reset(&mut self) {
        for slot in FontSlot::ALL {
            let entry = &mut self.slots[slot.index()];
            let default = entry.default.clone();
            entry.current = match entry.current {
                SlotValue::Linked(_) => SlotValue::Linked(default),
                SlotValue::Overridden(_) => SlotValue::Overridden(default),
            };
        }
        self.relink();
    }

    fn unlink_to_default(&mut self, slot: FontSlot) {
        if slot.is_dependent() {
            let entry = &mut self.slots[slot.index()];
            entry.current = SlotValue::Overridden(entry.default.clone());
        }
    }

    fn after_change(&mut self, slot: FontSlot, extensions: bool) {
        if !extensions && matches!(slot, FontSlot::Text | FontSlot::Chord) {
            self.relink();
        }
    }

    /// Re-derive every still-linked slot from the text (and chord) style.
    fn relink(&mut self) {
        let text = self.current(FontSlot::Text).clone();
        let chord_family = self.current(FontSlot::Chord).family.clone();
        for slot in [FontSlot::Mono, FontSlot::Comment, FontSlot::CommentItalic] {
            let mono_family = self.default_of(FontSlot::Mono).family.clone();
            let entry = &mut self.slots[slot.index()];
            if let SlotValue::Linked(_) = entry.current {
                let spec = entry.current.spec_mut();
                match slot {
                    FontSlot::Comment => *spec = text.clone(),
                    FontSlot::CommentItalic => {
                        *spec = FontSpec::new(chord_family.clone(), text.size)
                    }
                    _ => *spec = FontSpec::new(mono_family, text.size - MONO_SIZE_DECREMENT),
                }
            }
        }
    }
}
