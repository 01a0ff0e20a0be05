// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Line-oriented text blocks and bullet prefixing.
//!
//! **DDD Context:** Code Generation / Layout
//!
//! A [`TextBlock`] is an ordered list of lines. Comments, bullet lists and the
//! free-text parts of generated files are all assembled as text blocks and
//! converted to a [`Document`] at the end.

use ecow::EcoString;

use super::document::{Document, join, line};

/// Which lines of a block receive the bullet glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulletMode {
    /// Every line starts with the glyph.
    All,
    /// Only the first line starts with the glyph; the others are aligned
    /// underneath the text of the first line.
    FirstOnly,
}

/// A bullet prefix applied to every (or the first) line of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BulletList {
    glyph: EcoString,
    mode: BulletMode,
    width: usize,
}

impl BulletList {
    /// A bullet list with `glyph` followed by at least one space.
    #[must_use]
    pub fn new(glyph: impl Into<EcoString>, mode: BulletMode) -> Self {
        let glyph = glyph.into();
        let width = glyph.chars().count() + 1;
        Self { glyph, mode, width }
    }

    /// The `//` prefix used for C++ line comments.
    #[must_use]
    pub fn comment() -> Self {
        Self::new("//", BulletMode::All)
    }

    /// The `-` prefix used for lists inside comments.
    #[must_use]
    pub fn dash() -> Self {
        Self::new("-", BulletMode::All)
    }

    /// Pad the glyph and its trailing space to at least `width` characters.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(self.glyph.chars().count() + 1);
        self
    }

    fn prefix(&self) -> String {
        format!("{:<width$}", format!("{} ", self.glyph), width = self.width)
    }
}

/// An ordered list of text lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextBlock {
    lines: Vec<EcoString>,
}

impl TextBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `text` into lines. A trailing newline does not add an empty line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(EcoString::from).collect(),
        }
    }

    /// Build a block from already separated lines. Embedded newlines are split.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut block = Self::new();
        for text in lines {
            block.push(text.as_ref());
        }
        block
    }

    /// Append `text`, splitting it into lines. An empty string appends one
    /// empty line.
    pub fn push(&mut self, text: &str) {
        if text.is_empty() {
            self.lines.push(EcoString::new());
        } else {
            self.lines.extend(text.lines().map(EcoString::from));
        }
    }

    /// Append an empty line.
    pub fn push_blank(&mut self) {
        self.lines.push(EcoString::new());
    }

    /// Append all lines of `other`.
    pub fn extend(&mut self, other: TextBlock) {
        self.lines.extend(other.lines);
    }

    #[must_use]
    pub fn lines(&self) -> &[EcoString] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Remove leading and trailing lines that contain only whitespace.
    #[must_use]
    pub fn trimmed(mut self) -> Self {
        let is_blank = |l: &EcoString| l.trim().is_empty();
        let start = self.lines.iter().position(|l| !is_blank(l));
        match start {
            None => self.lines.clear(),
            Some(start) => {
                let end = self
                    .lines
                    .iter()
                    .rposition(|l| !is_blank(l))
                    .map_or(self.lines.len(), |end| end + 1);
                self.lines.truncate(end);
                self.lines.drain(..start);
            }
        }
        self
    }

    /// Prefix lines with the bullet glyph. Trailing whitespace is stripped, so
    /// an empty line becomes the bare glyph in [`BulletMode::All`], and stays
    /// empty on continuation lines of [`BulletMode::FirstOnly`].
    #[must_use]
    pub fn bulleted(&self, bullet: &BulletList) -> Self {
        let prefix = bullet.prefix();
        let continuation = " ".repeat(prefix.chars().count());
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let lead = match bullet.mode {
                    BulletMode::All => prefix.as_str(),
                    BulletMode::FirstOnly if index == 0 => prefix.as_str(),
                    BulletMode::FirstOnly => continuation.as_str(),
                };
                EcoString::from(format!("{lead}{text}").trim_end())
            })
            .collect();
        Self { lines }
    }

    /// Prefix every non-empty line with `width` spaces.
    #[must_use]
    pub fn indented(&self, width: usize) -> Self {
        let pad = " ".repeat(width);
        let lines = self
            .lines
            .iter()
            .map(|text| {
                if text.is_empty() {
                    text.clone()
                } else {
                    EcoString::from(format!("{pad}{text}"))
                }
            })
            .collect();
        Self { lines }
    }

    /// Lines joined by `Line` documents.
    #[must_use]
    pub fn to_doc(&self) -> Document<'static> {
        join(
            self.lines.iter().map(|l| Document::String(l.to_string())),
            &line(),
        )
    }
}

impl<S: AsRef<str>> FromIterator<S> for TextBlock {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_lines(iter)
    }
}
