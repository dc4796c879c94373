//! Terminal writer: batches the relative cursor motions and capability
//! escapes [`display::Display`] decides on into one queued flush.
//!
//! A readline-style prompt never knows its absolute row in the terminal's
//! scrollback, only its position relative to where the prompt started —
//! so every motion here is relative (up/down/left/right, carriage return),
//! unlike the teacher's original `Writer`, which queued absolute
//! `MoveTo(x, y)` against a full-screen `Frame`. Insert/delete-character
//! escapes (`parm_ich`/`parm_dch` in terminfo terms) have no crossterm
//! helper, so they're emitted as raw ANSI CSI sequences the same way
//! `core-terminal::Console::puts` does for its own capability table.

use anyhow::Result;
use crossterm::{
    cursor::{MoveDown, MoveLeft, MoveRight, MoveUp},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{stdout, Write};

#[derive(Debug)]
pub enum Command {
    CarriageReturn,
    Up(u16),
    Down(u16),
    Left(u16),
    Right(u16),
    ClearToEol,
    ClearAll,
    Print(String),
    InsertChars(u16),
    DeleteChars(u16),
    Bell,
    /// Reverse-video flash, for `BELL_STYLE = visible`.
    Flash,
}

#[derive(Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn carriage_return(&mut self) {
        self.cmds.push(Command::CarriageReturn);
    }
    pub fn up(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::Up(n));
        }
    }
    pub fn down(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::Down(n));
        }
    }
    pub fn left(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::Left(n));
        }
    }
    pub fn right(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::Right(n));
        }
    }
    pub fn clear_to_eol(&mut self) {
        self.cmds.push(Command::ClearToEol);
    }
    pub fn clear_all(&mut self) {
        self.cmds.push(Command::ClearAll);
    }
    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }
    pub fn insert_chars(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::InsertChars(n));
        }
    }
    pub fn delete_chars(&mut self, n: u16) {
        if n > 0 {
            self.cmds.push(Command::DeleteChars(n));
        }
    }
    pub fn bell(&mut self) {
        self.cmds.push(Command::Bell);
    }
    pub fn flash(&mut self) {
        self.cmds.push(Command::Flash);
    }

    pub fn flush(self) -> Result<()> {
        let mut out = stdout();
        for c in self.cmds {
            match c {
                Command::CarriageReturn => {
                    queue!(out, Print("\r"))?;
                }
                Command::Up(n) => {
                    queue!(out, MoveUp(n))?;
                }
                Command::Down(n) => {
                    queue!(out, MoveDown(n))?;
                }
                Command::Left(n) => {
                    queue!(out, MoveLeft(n))?;
                }
                Command::Right(n) => {
                    queue!(out, MoveRight(n))?;
                }
                Command::ClearToEol => {
                    queue!(out, Clear(ClearType::UntilNewLine))?;
                }
                Command::ClearAll => {
                    queue!(out, Clear(ClearType::All))?;
                }
                Command::Print(s) => {
                    queue!(out, Print(s))?;
                }
                Command::InsertChars(n) => {
                    queue!(out, Print(format!("\x1b[{n}@")))?;
                }
                Command::DeleteChars(n) => {
                    queue!(out, Print(format!("\x1b[{n}P")))?;
                }
                Command::Bell => {
                    queue!(out, Print("\x07"))?;
                }
                Command::Flash => {
                    queue!(out, Print("\x1b[?5h\x1b[?5l"))?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }
}
