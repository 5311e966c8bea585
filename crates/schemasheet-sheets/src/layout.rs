//! Table documentation sheet layout
//!
//! A sheet is a fixed block of header regions followed by one row per CSV
//! data row. Both halves are declared as data ([`TABLE_HEADER`] and
//! [`DATA_ROW`]) and turned into [`LayoutCell`]s by one emission loop; each
//! cell then expands into Sheets batch-update requests.

use crate::model::{
    Border, CellData, CellFormat, Color, ExtendedValue, GridCoordinate, GridRange,
    HorizontalAlign, MergeCellsRequest, MergeType, RepeatCellRequest, Request, RowData,
    TextFormat, UpdateBordersRequest, UpdateCellsRequest, VerticalAlign,
};
use schemasheet_csv::TableCsv;

/// Data row `i` (1-based) lands on sheet row `i + DATA_ROW_OFFSET`
pub const DATA_ROW_OFFSET: u32 = 6;

/// Sheet row holding the field header
pub const FIELD_HEADER_ROW: u32 = 6;

/// Columns covered by the template
pub const TEMPLATE_WIDTH: u32 = 14;

pub const FONT_SIZE: u32 = 10;

/// Field mask of the repeat-cell request
pub const CELL_FIELDS: &str =
    "userEnteredFormat(backgroundColor,horizontalAlignment,verticalAlignment,textFormat),userEnteredValue";

const INDEX_LINK_COLUMN: u32 = 1;

/// Visual style of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Bold label on the dark background
    Title,
    /// Label on the dark background
    Label,
    /// Free-text value on white
    Value,
    /// Centered value on white (flags, row numbers)
    Flag,
}

impl Style {
    pub fn format(self) -> CellFormat {
        let (background, foreground, align, bold) = match self {
            Style::Title => (Color::DARK_GREY, Color::WHITE, HorizontalAlign::Center, true),
            Style::Label => (Color::DARK_GREY, Color::WHITE, HorizontalAlign::Center, false),
            Style::Value => (Color::WHITE, Color::DARK_GREY, HorizontalAlign::Left, false),
            Style::Flag => (Color::WHITE, Color::DARK_GREY, HorizontalAlign::Center, false),
        };

        CellFormat {
            background_color: Some(background),
            horizontal_alignment: Some(align),
            vertical_alignment: Some(VerticalAlign::Middle),
            text_format: Some(TextFormat {
                foreground_color: Some(foreground),
                font_size: Some(FONT_SIZE),
                bold: Some(bold),
            }),
        }
    }
}

/// What a header region displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Text(&'static str),
    TableName,
    Empty,
}

/// A named rectangle of the header block; `rows` and `cols` are half-open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub rows: (u32, u32),
    pub cols: (u32, u32),
    pub style: Style,
    pub content: Content,
}

const fn region(
    name: &'static str,
    rows: (u32, u32),
    cols: (u32, u32),
    style: Style,
    content: Content,
) -> Region {
    Region { name, rows, cols, style, content }
}

const fn label(name: &'static str, rows: (u32, u32), cols: (u32, u32), text: &'static str) -> Region {
    region(name, rows, cols, Style::Label, Content::Text(text))
}

const fn blank(name: &'static str, rows: (u32, u32), cols: (u32, u32)) -> Region {
    region(name, rows, cols, Style::Value, Content::Empty)
}

/// Header block, emitted in this order
pub const TABLE_HEADER: &[Region] = &[
    region("title", (0, 2), (0, 3), Style::Title, Content::Text("Table Definition")),
    label("logical_name_label", (0, 1), (3, 5), "Logical Name"),
    label("physical_name_label", (1, 2), (3, 5), "Physical Name"),
    blank("logical_name", (0, 1), (5, 10)),
    region("physical_name", (1, 2), (5, 10), Style::Value, Content::TableName),
    label("author_label", (0, 1), (10, 11), "Author"),
    blank("author", (0, 1), (11, 12)),
    label("editor_label", (0, 1), (12, 13), "Editor"),
    blank("editor", (0, 1), (13, 14)),
    label("created_label", (1, 2), (10, 11), "Created"),
    blank("created", (1, 2), (11, 12)),
    label("updated_label", (1, 2), (12, 13), "Updated"),
    blank("updated", (1, 2), (13, 14)),
    label("description_label", (2, 4), (0, 2), "Description"),
    blank("description", (2, 4), (2, 14)),
    label("no_header", (6, 7), (0, 1), "No"),
    label("column_name_header", (6, 7), (1, 4), "Column Name"),
    label("type_header", (6, 7), (4, 5), "Type"),
    label("primary_key_header", (6, 7), (5, 6), "PK"),
    label("nullable_header", (6, 7), (6, 7), "NULL"),
    label("unique_header", (6, 7), (7, 8), "Unique"),
    label("index_header", (6, 7), (8, 9), "Index"),
    label("foreign_key_header", (6, 7), (9, 10), "FK"),
    label("foreign_key_table_header", (6, 7), (10, 11), "FK Table"),
    label("foreign_key_column_header", (6, 7), (11, 12), "FK Column"),
    label("comment_header", (6, 7), (12, 14), "Comment"),
];

/// What a data-row span displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowContent {
    /// 1-based record number
    RowNumber,
    /// CSV field by index
    Field(usize),
}

/// A column span of the data-row template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub name: &'static str,
    pub cols: (u32, u32),
    pub style: Style,
    pub content: RowContent,
}

const fn span(name: &'static str, cols: (u32, u32), style: Style, content: RowContent) -> RowSpan {
    RowSpan { name, cols, style, content }
}

/// Data-row template, aligned with the field header columns
pub const DATA_ROW: &[RowSpan] = &[
    span("no", (0, 1), Style::Flag, RowContent::RowNumber),
    span("column_name", (1, 4), Style::Value, RowContent::Field(0)),
    span("type", (4, 5), Style::Value, RowContent::Field(1)),
    span("primary_key", (5, 6), Style::Flag, RowContent::Field(2)),
    span("nullable", (6, 7), Style::Flag, RowContent::Field(3)),
    span("unique", (7, 8), Style::Flag, RowContent::Field(4)),
    span("index", (8, 9), Style::Flag, RowContent::Field(5)),
    span("foreign_key", (9, 10), Style::Flag, RowContent::Field(6)),
    span("foreign_key_table", (10, 11), Style::Value, RowContent::Field(7)),
    span("foreign_key_column", (11, 12), Style::Value, RowContent::Field(8)),
    span("comment", (12, 14), Style::Value, RowContent::Field(9)),
];

/// Value written into a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Formula(String),
}

impl CellValue {
    fn text(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }

    fn to_extended(&self) -> Option<ExtendedValue> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(ExtendedValue::StringValue(s.clone())),
            CellValue::Formula(f) => Some(ExtendedValue::FormulaValue(f.clone())),
        }
    }
}

/// One formatted rectangle of a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCell {
    pub name: &'static str,
    pub rows: (u32, u32),
    pub cols: (u32, u32),
    pub style: Style,
    pub value: CellValue,
}

impl LayoutCell {
    pub fn range(&self, sheet_id: i64) -> GridRange {
        GridRange {
            sheet_id,
            start_row_index: self.rows.0,
            end_row_index: self.rows.1,
            start_column_index: self.cols.0,
            end_column_index: self.cols.1,
        }
    }

    /// Whether the rectangle covers more than one grid cell
    pub fn is_merged(&self) -> bool {
        self.rows.1 - self.rows.0 > 1 || self.cols.1 - self.cols.0 > 1
    }

    /// Merge (multi-cell only), then format and value, then borders
    pub fn to_requests(&self, sheet_id: i64) -> Vec<Request> {
        let range = self.range(sheet_id);
        let mut requests = Vec::with_capacity(3);

        if self.is_merged() {
            requests.push(Request::MergeCells(MergeCellsRequest {
                range,
                merge_type: MergeType::MergeAll,
            }));
        }

        requests.push(Request::RepeatCell(RepeatCellRequest {
            range,
            cell: CellData {
                user_entered_value: self.value.to_extended(),
                user_entered_format: Some(self.style.format()),
            },
            fields: CELL_FIELDS.to_string(),
        }));

        requests.push(Request::UpdateBorders(UpdateBordersRequest::uniform(range, Border::THIN)));

        requests
    }
}

/// Cells of one table sheet: header block, then one row per CSV data row
pub fn table_sheet_cells(table: &TableCsv) -> Vec<LayoutCell> {
    let mut cells = Vec::with_capacity(TABLE_HEADER.len() + table.row_count() * DATA_ROW.len());

    for region in TABLE_HEADER {
        let value = match region.content {
            Content::Text(text) => CellValue::text(text),
            Content::TableName => CellValue::text(&table.table_name),
            Content::Empty => CellValue::Empty,
        };
        cells.push(LayoutCell {
            name: region.name,
            rows: region.rows,
            cols: region.cols,
            style: region.style,
            value,
        });
    }

    for record in 1..=table.row_count() {
        let row = record as u32 + DATA_ROW_OFFSET;
        for span in DATA_ROW {
            let value = match span.content {
                RowContent::RowNumber => CellValue::Text(record.to_string()),
                RowContent::Field(index) => CellValue::text(table.field(record - 1, index)),
            };
            cells.push(LayoutCell {
                name: span.name,
                rows: (row, row + 1),
                cols: span.cols,
                style: span.style,
                value,
            });
        }
    }

    cells
}

/// Batch-update requests that render `table` onto sheet `sheet_id`
pub fn table_sheet_requests(sheet_id: i64, table: &TableCsv) -> Vec<Request> {
    table_sheet_cells(table)
        .iter()
        .flat_map(|cell| cell.to_requests(sheet_id))
        .collect()
}

/// A table sheet that made it into the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub title: String,
    pub sheet_id: i64,
    pub rows: usize,
}

/// `=HYPERLINK("#gid=<id>","<text>")`, quotes in `text` doubled
pub fn hyperlink_formula(sheet_id: i64, text: &str) -> String {
    format!("=HYPERLINK(\"#gid={}\",\"{}\")", sheet_id, text.replace('"', "\"\""))
}

/// One link per entry in column B of the index sheet, in entry order
pub fn index_requests(index_sheet_id: i64, entries: &[SheetEntry]) -> Vec<Request> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Request::UpdateCells(UpdateCellsRequest {
                start: GridCoordinate {
                    sheet_id: index_sheet_id,
                    row_index: i as u32,
                    column_index: INDEX_LINK_COLUMN,
                },
                rows: vec![RowData {
                    values: vec![CellData {
                        user_entered_value: Some(ExtendedValue::FormulaValue(hyperlink_formula(
                            entry.sheet_id,
                            &entry.title,
                        ))),
                        user_entered_format: None,
                    }],
                }],
                fields: "userEnteredValue".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn users_csv() -> TableCsv {
        let row = |fields: &[&str]| {
            let mut row: Vec<String> = fields.iter().map(|s| s.to_string()).collect();
            row.resize(10, String::new());
            row
        };
        TableCsv {
            table_name: "users".to_string(),
            header: schemasheet_csv::HEADER.iter().map(|s| s.to_string()).collect(),
            rows: vec![
                row(&["id", "int", "○", "×", "×", "○", "×", "", "", ""]),
                row(&["email", "varchar(255)", "×", "×", "○", "○", "×", "", "", "login"]),
                row(&["dept_id", "int", "×", "○", "×", "○", "○", "departments", "id", ""]),
            ],
        }
    }

    #[test]
    fn regions_stay_inside_template() {
        for region in TABLE_HEADER {
            assert!(region.rows.0 < region.rows.1, "{}", region.name);
            assert!(region.cols.0 < region.cols.1, "{}", region.name);
            assert!(region.cols.1 <= TEMPLATE_WIDTH, "{}", region.name);
        }
    }

    #[test]
    fn data_row_tiles_the_width() {
        let mut next = 0;
        for span in DATA_ROW {
            assert_eq!(span.cols.0, next, "{}", span.name);
            next = span.cols.1;
        }
        assert_eq!(next, TEMPLATE_WIDTH);
    }

    #[test]
    fn field_header_matches_data_columns() {
        let headers: Vec<_> = TABLE_HEADER
            .iter()
            .filter(|r| r.rows == (FIELD_HEADER_ROW, FIELD_HEADER_ROW + 1))
            .map(|r| r.cols)
            .collect();
        let spans: Vec<_> = DATA_ROW.iter().map(|s| s.cols).collect();
        assert_eq!(headers, spans);
    }

    #[test]
    fn data_rows_follow_header() {
        let cells = table_sheet_cells(&users_csv());
        assert_eq!(cells.len(), TABLE_HEADER.len() + 3 * DATA_ROW.len());

        let names: Vec<_> = cells
            .iter()
            .filter(|c| c.name == "column_name")
            .map(|c| (c.rows.0, c.value.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                (7, CellValue::Text("id".to_string())),
                (8, CellValue::Text("email".to_string())),
                (9, CellValue::Text("dept_id".to_string())),
            ]
        );

        let numbers: Vec<_> = cells
            .iter()
            .filter(|c| c.name == "no")
            .map(|c| c.value.clone())
            .collect();
        assert_eq!(numbers[0], CellValue::Text("1".to_string()));
        assert_eq!(numbers[2], CellValue::Text("3".to_string()));
    }

    #[test]
    fn physical_name_carries_table() {
        let cells = table_sheet_cells(&users_csv());
        let physical = cells.iter().find(|c| c.name == "physical_name").unwrap();
        assert_eq!(physical.value, CellValue::Text("users".to_string()));
        assert_eq!(physical.rows, (1, 2));
        assert_eq!(physical.cols, (5, 10));

        let logical = cells.iter().find(|c| c.name == "logical_name").unwrap();
        assert_eq!(logical.value, CellValue::Empty);
    }

    #[test]
    fn merged_cell_requests() {
        let cell = LayoutCell {
            name: "title",
            rows: (0, 2),
            cols: (0, 3),
            style: Style::Title,
            value: CellValue::Text("Table Definition".to_string()),
        };
        let requests = cell.to_requests(42);
        let kinds: Vec<_> = requests.iter().map(Request::kind).collect();
        assert_eq!(kinds, ["mergeCells", "repeatCell", "updateBorders"]);

        let Request::RepeatCell(repeat) = &requests[1] else {
            panic!("expected repeatCell");
        };
        assert_eq!(repeat.range.sheet_id, 42);
        assert_eq!(repeat.fields, CELL_FIELDS);
        let format = repeat.cell.user_entered_format.as_ref().unwrap();
        assert_eq!(format.background_color, Some(Color::DARK_GREY));
        let text = format.text_format.as_ref().unwrap();
        assert_eq!(text.bold, Some(true));
        assert_eq!(text.font_size, Some(10));
        assert_eq!(text.foreground_color, Some(Color::WHITE));
    }

    #[test]
    fn single_cell_is_not_merged() {
        let cell = LayoutCell {
            name: "type",
            rows: (7, 8),
            cols: (4, 5),
            style: Style::Value,
            value: CellValue::Text("int".to_string()),
        };
        let kinds: Vec<_> = cell.to_requests(1).iter().map(Request::kind).collect();
        assert_eq!(kinds, ["repeatCell", "updateBorders"]);
    }

    #[test]
    fn empty_table_has_only_header() {
        let table = TableCsv {
            table_name: "empty".to_string(),
            header: Vec::new(),
            rows: Vec::new(),
        };
        assert_eq!(table_sheet_cells(&table).len(), TABLE_HEADER.len());
    }

    #[test]
    fn index_links() {
        let entries = vec![
            SheetEntry { title: "departments".to_string(), sheet_id: 101, rows: 2 },
            SheetEntry { title: "users".to_string(), sheet_id: 102, rows: 3 },
        ];
        let requests = index_requests(0, &entries);
        assert_eq!(requests.len(), 2);

        let Request::UpdateCells(second) = &requests[1] else {
            panic!("expected updateCells");
        };
        assert_eq!(second.start.row_index, 1);
        assert_eq!(second.start.column_index, 1);
        assert_eq!(second.fields, "userEnteredValue");
        assert_eq!(
            second.rows[0].values[0].user_entered_value,
            Some(ExtendedValue::FormulaValue("=HYPERLINK(\"#gid=102\",\"users\")".to_string()))
        );
    }

    #[test]
    fn formula_quotes_are_doubled() {
        assert_eq!(hyperlink_formula(7, "a\"b"), "=HYPERLINK(\"#gid=7\",\"a\"\"b\")");
    }

    #[test]
    fn empty_index() {
        assert!(index_requests(0, &[]).is_empty());
    }
}
