use ratatui::style::{Color, Modifier, Style};

/// Dark/light display toggle. Purely presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }

    pub fn palette(self) -> Theme {
        match self {
            ThemeMode::Dark => Theme {
                background: Color::Rgb(0x1e, 0x1e, 0x1e),
                text: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                user: Color::LightBlue,
                assistant: Color::LightGreen,
            },
            ThemeMode::Light => Theme {
                background: Color::Rgb(0xff, 0xff, 0xff),
                text: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                user: Color::Blue,
                assistant: Color::Rgb(0x1b, 0x5e, 0x20),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
}

impl Theme {
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn muted(&self) -> Style {
        self.base().fg(self.muted)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.base().fg(self.accent)
        } else {
            self.muted()
        }
    }
}
