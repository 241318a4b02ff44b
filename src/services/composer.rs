/// Keys the input control reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        }
    }

    pub fn with_ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        }
    }
}

/// What a key press asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Submit,
    Edited,
}

/// Text-entry control: buffer, auto-grow height and focus.
#[derive(Debug)]
pub struct Composer {
    text: String,
    max_rows: usize,
    focused: bool,
}

impl Composer {
    pub fn new(max_rows: usize) -> Self {
        Self {
            text: String::new(),
            max_rows: max_rows.max(1),
            focused: true,
        }
    }

    /// Ctrl/Cmd+Enter and bare Enter submit. Shift+Enter inserts a newline.
    pub fn handle_key(&mut self, press: KeyPress) -> KeyAction {
        let Modifiers { shift, ctrl, meta } = press.modifiers;
        match press.key {
            Key::Enter if ctrl || meta => KeyAction::Submit,
            Key::Enter if !shift => KeyAction::Submit,
            Key::Enter => {
                self.text.push('\n');
                KeyAction::Edited
            }
            Key::Backspace => {
                self.text.pop();
                KeyAction::Edited
            }
            Key::Char(c) => {
                self.text.push(c);
                KeyAction::Edited
            }
        }
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Visible height in rows: grows with content up to the cap.
    pub fn visible_rows(&self) -> usize {
        self.line_count().clamp(1, self.max_rows)
    }

    pub fn scrolls(&self) -> bool {
        self.line_count() > self.max_rows
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }
}
