use terminal_size::{Width, terminal_size};

use super::BroadcastRecord;

/// Width used when the terminal cannot be probed.
pub const FALLBACK_WIDTH: usize = 40;

const ELLIPSIS: &str = "...";

/// Displayable attributes of a broadcast. Callers whitelist a subset of
/// these; nothing outside the whitelist ever reaches a rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Title,
    Game,
    Date,
    Length,
}

/// Column order used when the caller does not supply a whitelist.
pub const CANONICAL_FIELDS: [Field; 5] =
    [Field::Id, Field::Title, Field::Game, Field::Date, Field::Length];

impl Field {
    pub fn header(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Game => "game",
            Field::Date => "date",
            Field::Length => "length",
        }
    }

    fn value(&self, record: &BroadcastRecord) -> String {
        match self {
            Field::Id => record.id.as_str().to_string(),
            Field::Title => record.title.clone(),
            Field::Game => record.game.clone(),
            Field::Date => record.published_date(),
            Field::Length => record.length_display(),
        }
    }
}

/// One record projected onto a field whitelist, values already truncated.
///
/// Construction is pure; the source record is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    cells: Vec<(Field, String)>,
}

impl DisplayRow {
    pub fn project(record: &BroadcastRecord, fields: &[Field], width: usize) -> Self {
        let fields = if fields.is_empty() {
            &CANONICAL_FIELDS[..]
        } else {
            fields
        };
        Self {
            cells: fields
                .iter()
                .map(|f| (*f, truncate(&f.value(record), width)))
                .collect(),
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.cells
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.cells.iter().map(|(f, _)| *f)
    }

    pub fn cells(&self) -> impl Iterator<Item = (Field, &str)> {
        self.cells.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

/// Cuts `value` down to exactly `width` characters, ellipsis included.
/// Values that already fit pass through unchanged.
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let keep = width.saturating_sub(ELLIPSIS.len());
    let mut out: String = value.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// A rendered selection table. Row `i` of the input appears with the
/// 1-based index `i + 1`; `by_index` on the backing list uses the same
/// numbering, so a prompted index maps straight back to its record.
#[derive(Debug, Clone)]
pub struct Listing {
    pub text: String,
    pub rows: usize,
}

/// Renders the records as an indexed table. `fields` empty falls back to
/// [`CANONICAL_FIELDS`]; `width` caps every text cell. Pure: writes
/// nothing, mutates nothing.
pub fn render(records: &[BroadcastRecord], fields: &[Field], width: usize) -> Listing {
    let fields = if fields.is_empty() {
        &CANONICAL_FIELDS[..]
    } else {
        fields
    };

    let rows: Vec<DisplayRow> = records
        .iter()
        .map(|r| DisplayRow::project(r, fields, width))
        .collect();

    // Column widths: widest cell per field, header included.
    let col_widths: Vec<usize> = fields
        .iter()
        .map(|f| {
            rows.iter()
                .filter_map(|row| row.get(*f))
                .map(|v| v.chars().count())
                .chain(std::iter::once(f.header().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let index_width = records.len().to_string().len().max(1);

    let mut text = String::new();
    let header_cells: Vec<String> = fields
        .iter()
        .zip(&col_widths)
        .map(|(f, w)| format!("{:<w$}", f.header(), w = w))
        .collect();
    text.push_str(&format!(
        "{:>iw$}  {}",
        "#",
        header_cells.join("  ").trim_end(),
        iw = index_width,
    ));
    text.push('\n');

    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = fields
            .iter()
            .zip(&col_widths)
            .map(|(f, w)| format!("{:<w$}", row.get(*f).unwrap_or(""), w = w))
            .collect();
        text.push_str(&format!(
            "{:>iw$}) {}",
            i + 1,
            cells.join("  ").trim_end(),
            iw = index_width,
        ));
        text.push('\n');
    }

    Listing {
        text,
        rows: records.len(),
    }
}

/// Lazily probed display width: half the terminal columns, with a fixed
/// fallback when there is no terminal to ask.
pub fn default_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| (w as usize) / 2)
        .unwrap_or(FALLBACK_WIDTH)
}
