#[derive(Clone, Copy, Debug)]
pub struct Glyphs {
    /// Marks the highlighted list row
    pub cursor: &'static str,
    /// Marks the active sequence
    pub active: &'static str,
    /// Shown next to sequences the service reports as compressed
    pub compressed: &'static str,
    pub h_separator: &'static str,
    /// Caret drawn at the end of text inputs
    pub caret: &'static str,
    pub ok: &'static str,
    pub fail: &'static str,
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        cursor: ">",
        active: "*",
        compressed: "gz",
        h_separator: "-",
        caret: "_",
        ok: "yes",
        fail: "no",
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        cursor: "▶",
        active: "●",
        compressed: "🗜",
        h_separator: "─",
        caret: "█",
        ok: "✔",
        fail: "✘",
    }
}
