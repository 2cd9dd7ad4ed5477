use ratatui::layout::Rect;
use tracing::debug;

use super::{
    input::{KeyInput, classify},
    modal::{ChoiceDialog, DIALOG_OK},
    options::DialogOptions,
    screen::Screen,
};
use crate::{
    domain::ValueKind,
    error::DialogResult,
    presentation::{ChoiceLayout, ChoiceList, Display},
};

const LINES: u16 = 10;
const COLUMNS: u16 = 20;

/// Asks which kind a new value should have. Up and Down pick the kind,
/// Left and Right pick the action, Enter settles both.
pub(crate) fn select_type<S: Screen>(
    screen: &mut S,
    display: &Display,
    options: &DialogOptions,
    below: Rect,
) -> DialogResult<Option<ValueKind>> {
    let mut dialog = ChoiceDialog::centered(
        display,
        options,
        "New Value",
        &["OK", "Cancel"],
        LINES,
        COLUMNS,
        below,
    )?;
    dialog.frame.write(0, 0, "Choose type:");

    let names: Vec<&str> = ValueKind::ALL.iter().map(|kind| kind.name()).collect();
    let codes: Vec<i32> = ValueKind::ALL.iter().map(|kind| kind.code()).collect();
    let mut types = ChoiceList::attach_at(
        &dialog.frame,
        &names,
        ChoiceLayout::Grid { columns: 1 },
        Rect::new(0, 1, COLUMNS - 2, 6),
    )?
    .with_mark(options.choice_mark.to_string())
    .with_tags(&codes);
    types.first();
    types.focus();
    screen.update(display)?;

    loop {
        let key = classify(&screen.read_key()?);
        match key {
            KeyInput::Up | KeyInput::Down => {
                types.drive(key);
                types.focus();
            }
            KeyInput::Left | KeyInput::Right => {
                dialog.choices.drive(key);
                dialog.choices.focus();
            }
            KeyInput::Enter => {
                let code = types.current_tag();
                let action = dialog.choices.current_tag();
                let kind = ValueKind::from_code(code).filter(|_| action == DIALOG_OK);
                debug!(?kind, "type picker closed");
                return Ok(kind);
            }
            _ => {}
        }
        screen.update(display)?;
    }
}
