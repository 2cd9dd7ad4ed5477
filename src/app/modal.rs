//! Notices and text prompts: frames with a row of actions, driven by a
//! blocking read, dispatch and redraw loop.

use std::borrow::Cow;

use ratatui::layout::Rect;
use tracing::{debug, trace};
use unicode_width::UnicodeWidthStr;

use super::{
    input::{KeyInput, classify},
    options::DialogOptions,
    screen::Screen,
};
use crate::{
    error::DialogResult,
    form::{TextField, codec::trim_spaces},
    presentation::{ChoiceList, Display, OverlayFrame},
};

pub const DIALOG_OK: i32 = 0;
pub const DIALOG_CANCEL: i32 = 1;
pub const DIALOG_RESIZE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A single "Ok".
    Alert,
    /// "Ok" and "Cancel".
    Confirm,
}

impl NoticeKind {
    fn labels(self) -> &'static [&'static str] {
        match self {
            NoticeKind::Alert => &["Ok"],
            NoticeKind::Confirm => &["Ok", "Cancel"],
        }
    }
}

/// A frame with an action row on its last content line.
#[derive(Debug)]
pub(crate) struct ChoiceDialog {
    pub(crate) choices: ChoiceList,
    pub(crate) frame: OverlayFrame,
}

impl ChoiceDialog {
    pub(crate) fn centered(
        display: &Display,
        options: &DialogOptions,
        title: &str,
        labels: &[&str],
        lines: u16,
        columns: u16,
        below: Rect,
    ) -> DialogResult<Self> {
        let frame = OverlayFrame::create_centered(display, title, lines, columns, below)?;
        let choices =
            ChoiceList::attach(&frame, labels)?.with_mark(options.choice_mark.to_string());
        Ok(Self { choices, frame })
    }
}

/// Message text laid out for a frame no wider than `below`.
struct MessageLayout {
    rows: Vec<String>,
    columns: u16,
}

impl MessageLayout {
    fn new(message: &str, options: &DialogOptions, below: Rect) -> Self {
        let natural = message.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let room = usize::from(below.width.saturating_sub(2)).max(1);
        let mut rows: Vec<String> = if natural <= room {
            message.lines().map(str::to_string).collect()
        } else {
            textwrap::wrap(message, room)
                .into_iter()
                .map(Cow::into_owned)
                .collect()
        };
        if rows.is_empty() {
            rows.push(String::new());
        }
        let widest = rows.iter().map(|row| row.width()).max().unwrap_or(0);
        let columns = u16::try_from(widest + 2)
            .unwrap_or(u16::MAX)
            .max(options.min_message_width);
        Self { rows, columns }
    }

    fn extra_lines(&self) -> u16 {
        u16::try_from(self.rows.len().saturating_sub(1)).unwrap_or(u16::MAX)
    }

    fn write(&self, frame: &OverlayFrame) {
        for (row, text) in (0..).zip(&self.rows) {
            frame.write(row, 0, text);
        }
    }
}

/// Drives `dialog` until its action row resolves, then tears it down and
/// returns the resolved tag.
pub(crate) fn run_modal<S: Screen>(screen: &mut S, mut dialog: ChoiceDialog) -> DialogResult<i32> {
    let display = dialog.frame.display().clone();
    dialog.frame.park_cursor(0, 0);
    screen.update(&display)?;
    loop {
        let key = classify(&screen.read_key()?);
        if let Some(tag) = dialog.choices.drive(key) {
            return Ok(tag);
        }
        dialog.choices.focus();
        screen.update(&display)?;
    }
}

pub(crate) fn show_notice<S: Screen>(
    screen: &mut S,
    display: &Display,
    options: &DialogOptions,
    kind: NoticeKind,
    title: &str,
    below: Rect,
    message: &str,
) -> DialogResult<i32> {
    let layout = MessageLayout::new(message, options, below);
    let lines = options.notice_lines.saturating_add(layout.extra_lines());
    let dialog = ChoiceDialog::centered(
        display,
        options,
        title,
        kind.labels(),
        lines,
        layout.columns,
        below,
    )?;
    layout.write(&dialog.frame);
    debug!(title, ?kind, "notice opened");
    let tag = run_modal(screen, dialog)?;
    debug!(title, tag, "notice closed");
    Ok(tag)
}

/// Asks for one line of text. Returns the trimmed text when confirmed with
/// "Ok" and `None` on "Cancel".
pub(crate) fn prompt_text<S: Screen>(
    screen: &mut S,
    display: &Display,
    options: &DialogOptions,
    title: &str,
    below: Rect,
    message: &str,
) -> DialogResult<Option<String>> {
    let layout = MessageLayout::new(message, options, below);
    let lines = options.prompt_lines.saturating_add(layout.extra_lines());
    let mut dialog = ChoiceDialog::centered(
        display,
        options,
        title,
        &["Ok", "Cancel"],
        lines,
        layout.columns,
        below,
    )?;
    layout.write(&dialog.frame);
    let width = dialog
        .frame
        .content_area()
        .map(|area| area.width.saturating_sub(2))
        .unwrap_or(1);
    let mut field = TextField::new(&dialog.frame, 1, width, 2 + layout.extra_lines(), 1)?;
    debug!(title, "prompt opened");

    let mut in_field = true;
    field.focus();
    screen.update(display)?;
    loop {
        let key = classify(&screen.read_key()?);
        match key {
            KeyInput::Tab | KeyInput::BackTab => {
                if !in_field {
                    in_field = true;
                } else if field.validate() {
                    in_field = false;
                    dialog.choices.first();
                } else {
                    trace!(title, "prompt input failed validation");
                }
            }
            _ if in_field => {
                field.handle_key(key);
            }
            _ => {
                if let Some(tag) = dialog.choices.drive(key) {
                    let text = field.text();
                    debug!(title, tag, "prompt closed");
                    return Ok((tag == DIALOG_OK).then(|| trim_spaces(&text).to_string()));
                }
            }
        }
        if in_field {
            field.focus();
        } else {
            dialog.choices.focus();
        }
        screen.update(display)?;
    }
}
