use std::borrow::Cow;

use crate::presentation::DEFAULT_MARK;

/// Sizes and limits shared by every dialog.
#[derive(Debug, Clone)]
pub struct DialogOptions {
    pub min_message_width: u16,
    pub notice_lines: u16,
    pub prompt_lines: u16,
    pub edit_columns: u16,
    pub hex_rows: u16,
    pub hex_bytes_per_row: usize,
    pub default_binary_len: usize,
    pub max_binary_len: usize,
    pub choice_mark: Cow<'static, str>,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            min_message_width: 20,
            notice_lines: 5,
            prompt_lines: 7,
            edit_columns: 50,
            hex_rows: 10,
            hex_bytes_per_row: 8,
            default_binary_len: 8,
            max_binary_len: 1 << 20,
            choice_mark: Cow::Borrowed(DEFAULT_MARK),
        }
    }
}

impl DialogOptions {
    pub fn with_min_message_width(mut self, width: u16) -> Self {
        self.min_message_width = width;
        self
    }

    pub fn with_notice_lines(mut self, lines: u16) -> Self {
        self.notice_lines = lines;
        self
    }

    pub fn with_prompt_lines(mut self, lines: u16) -> Self {
        self.prompt_lines = lines;
        self
    }

    pub fn with_edit_columns(mut self, columns: u16) -> Self {
        self.edit_columns = columns;
        self
    }

    pub fn with_hex_rows(mut self, rows: u16) -> Self {
        self.hex_rows = rows;
        self
    }

    pub fn with_hex_bytes_per_row(mut self, bytes: usize) -> Self {
        self.hex_bytes_per_row = bytes.max(1);
        self
    }

    pub fn with_default_binary_len(mut self, len: usize) -> Self {
        self.default_binary_len = len;
        self
    }

    pub fn with_max_binary_len(mut self, len: usize) -> Self {
        self.max_binary_len = len;
        self
    }

    pub fn with_choice_mark(mut self, mark: impl Into<Cow<'static, str>>) -> Self {
        self.choice_mark = mark.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let options = DialogOptions::default()
            .with_edit_columns(60)
            .with_hex_bytes_per_row(0)
            .with_choice_mark("> ");
        assert_eq!(options.edit_columns, 60);
        assert_eq!(options.hex_bytes_per_row, 1);
        assert_eq!(options.choice_mark, "> ");
        assert_eq!(options.max_binary_len, 1024 * 1024);
    }
}
