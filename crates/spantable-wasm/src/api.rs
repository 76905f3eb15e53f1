use serde::{Deserialize, Serialize};
use spantable_core::{
    col_to_label, Axis, CellId, CellKind, EditorOptions, LogicalRect, MenuItem, Section,
    TableCommand, TableEditor, TableError, TableLayout,
};
use wasm_bindgen::prelude::*;

/// Table editor exposed to JavaScript
#[wasm_bindgen]
pub struct TableEngine {
    editor: TableEditor,
}

/// Structured error object for JavaScript
#[derive(Debug, Serialize)]
pub struct JsTableError {
    code: String,
    message: String,
}

impl From<TableError> for JsTableError {
    fn from(err: TableError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

fn to_js_error(err: TableError) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&format!("[SpanTable] {}", err).into());

    let js_error = JsTableError::from(err);
    serde_wasm_bindgen::to_value(&js_error).unwrap_or(JsValue::NULL)
}

/// Cell data for JavaScript
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub id: u64,
    pub kind: CellKind,
    pub tag: String,
    pub content: String,
    pub rowspan: usize,
    pub colspan: usize,
    pub rect: Option<LogicalRect>,
    pub selected: bool,
}

/// Row data for JavaScript
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    pub section: Section,
    pub cells: Vec<CellData>,
}

/// Whole-table state handed back after every call
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub row_count: usize,
    pub column_count: usize,
    pub selection: Option<LogicalRect>,
    pub rows: Vec<RowData>,
}

/// Controller menu entry for JavaScript
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub item: MenuItem,
    pub label: String,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

fn parse_axis(axis: &str) -> Result<Axis, TableError> {
    match axis.trim().to_ascii_lowercase().as_str() {
        "row" => Ok(Axis::Row),
        "column" | "col" => Ok(Axis::Column),
        other => Err(TableError::invalid(format!("unknown axis `{other}`"))),
    }
}

fn parse_menu_item(item: &str) -> Result<MenuItem, TableError> {
    serde_json::from_value(serde_json::Value::String(item.to_string()))
        .map_err(|_| TableError::invalid(format!("unknown menu item `{item}`")))
}

/// Largest integer a JS number holds exactly
const MAX_SAFE_ID: f64 = 9_007_199_254_740_991.0;

/// Ids arrive as JS numbers, the same shape snapshots report them in
fn cell_id(raw: f64) -> Result<CellId, TableError> {
    if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 && raw <= MAX_SAFE_ID {
        Ok(CellId::new(raw as u64))
    } else {
        Err(TableError::invalid(format!("invalid cell id {raw}")))
    }
}

fn to_position(raw: Option<u32>) -> Option<usize> {
    raw.map(|p| p as usize)
}

// Native entry points, shared by the exported methods and the tests
impl TableEngine {
    fn create(layout_json: &str, options_json: Option<&str>) -> Result<TableEngine, TableError> {
        let layout = TableLayout::from_json(layout_json)?;
        let options = match options_json {
            Some(json) if !json.trim().is_empty() => EditorOptions::from_json(json)?,
            _ => EditorOptions::default(),
        };
        Ok(TableEngine {
            editor: TableEditor::from_layout(&layout, options),
        })
    }

    fn snapshot_data(&self) -> TableSnapshot {
        let grid = self.editor.grid();
        let rows = self
            .editor
            .table()
            .rows()
            .iter()
            .map(|row| RowData {
                section: row.section,
                cells: row
                    .cells
                    .iter()
                    .map(|cell| CellData {
                        id: cell.id().raw(),
                        kind: cell.kind,
                        tag: cell.kind.tag().to_string(),
                        content: cell.content.clone(),
                        rowspan: cell.rowspan(),
                        colspan: cell.colspan(),
                        rect: grid.rect(cell.id()),
                        selected: self.editor.is_selected(cell.id()),
                    })
                    .collect(),
            })
            .collect();

        TableSnapshot {
            summary: self.editor.summary().map(str::to_string),
            row_count: grid.row_count(),
            column_count: grid.col_count(),
            selection: self.editor.session().rect(),
            rows,
        }
    }

    fn apply(&mut self, command: TableCommand) -> Result<String, TableError> {
        self.editor.execute(command)?;
        Ok(to_json(&self.snapshot_data()))
    }

    fn apply_json(&mut self, command_json: &str) -> Result<String, TableError> {
        let command: TableCommand = serde_json::from_str(command_json)
            .map_err(|err| TableError::invalid(format!("malformed command: {err}")))?;
        self.apply(command)
    }

    fn apply_menu(&mut self, axis: &str, item: &str, index: u32) -> Result<String, TableError> {
        let axis = parse_axis(axis)?;
        let item = parse_menu_item(item)?;
        self.apply(item.command(axis, index as usize))
    }

    fn select_range(&mut self, range: &str) -> Result<String, TableError> {
        let rect = LogicalRect::from_a1(range)
            .ok_or_else(|| TableError::invalid(format!("invalid range `{range}`")))?;
        self.editor.select_rect(rect)?;
        Ok(to_json(&self.snapshot_data()))
    }

    fn menu_entries(axis: &str) -> Result<Vec<MenuEntry>, TableError> {
        let axis = parse_axis(axis)?;
        Ok(MenuItem::ALL
            .iter()
            .map(|item| MenuEntry {
                item: *item,
                label: item.label(axis),
            })
            .collect())
    }
}

#[wasm_bindgen]
impl TableEngine {
    /// Create an engine from a table layout JSON and optional options JSON
    #[wasm_bindgen(constructor)]
    pub fn new(layout_json: &str, options_json: Option<String>) -> Result<TableEngine, JsValue> {
        Self::create(layout_json, options_json.as_deref()).map_err(to_js_error)
    }

    /// Current table state as JSON
    #[wasm_bindgen]
    pub fn snapshot(&self) -> String {
        to_json(&self.snapshot_data())
    }

    // --- Pointer input ---

    /// Returns true when the selection changed
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, cell: f64) -> Result<bool, JsValue> {
        let id = cell_id(cell).map_err(to_js_error)?;
        self.editor.pointer_down(id).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, cell: f64) -> Result<bool, JsValue> {
        let id = cell_id(cell).map_err(to_js_error)?;
        self.editor.pointer_move(id).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> Result<bool, JsValue> {
        self.editor.pointer_up().map_err(to_js_error)
    }

    // --- Selection ---

    #[wasm_bindgen(js_name = isSelected)]
    pub fn is_selected(&self, cell: f64) -> bool {
        cell_id(cell).is_ok_and(|id| self.editor.is_selected(id))
    }

    /// Select an A1-style range such as `"A1:B2"`, widened over spans
    #[wasm_bindgen(js_name = selectRange)]
    pub fn select_range_a1(&mut self, range: &str) -> Result<String, JsValue> {
        self.select_range(range).map_err(to_js_error)
    }

    /// JSON array of selected cell ids
    #[wasm_bindgen(js_name = selectedCells)]
    pub fn selected_cells(&self) -> String {
        let ids: Vec<u64> = self.editor.selected_cells().iter().map(CellId::raw).collect();
        to_json(&ids)
    }

    #[wasm_bindgen(js_name = selectedText)]
    pub fn selected_text(&self) -> String {
        self.editor.selected_text()
    }

    // --- Merge/Split ---

    #[wasm_bindgen(js_name = mergeSelection)]
    pub fn merge_selection(&mut self) -> Result<String, JsValue> {
        self.apply(TableCommand::MergeSelection).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = splitCell)]
    pub fn split_cell(&mut self, cell: f64) -> Result<String, JsValue> {
        let cell = cell_id(cell).map_err(to_js_error)?;
        self.apply(TableCommand::SplitCell { cell }).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = splitSelection)]
    pub fn split_selection(&mut self) -> Result<String, JsValue> {
        self.apply(TableCommand::SplitSelection).map_err(to_js_error)
    }

    // --- Rows/Columns ---

    /// Insert a row; `kind` is "header" or "normal", position defaults to the end
    #[wasm_bindgen(js_name = insertRow)]
    pub fn insert_row(&mut self, kind: &str, position: Option<u32>) -> Result<String, JsValue> {
        let kind: CellKind = kind.parse().map_err(to_js_error)?;
        self.apply(TableCommand::InsertRow {
            kind,
            position: to_position(position),
        })
        .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = removeRow)]
    pub fn remove_row(&mut self, row: u32) -> Result<String, JsValue> {
        self.apply(TableCommand::RemoveRow { row: row as usize })
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = insertColumn)]
    pub fn insert_column(&mut self, kind: &str, position: Option<u32>) -> Result<String, JsValue> {
        let kind: CellKind = kind.parse().map_err(to_js_error)?;
        self.apply(TableCommand::InsertColumn {
            kind,
            position: to_position(position),
        })
        .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = removeColumn)]
    pub fn remove_column(&mut self, column: u32) -> Result<String, JsValue> {
        self.apply(TableCommand::RemoveColumn {
            column: column as usize,
        })
        .map_err(to_js_error)
    }

    // --- Kinds and content ---

    #[wasm_bindgen(js_name = changeCellKind)]
    pub fn change_cell_kind(
        &mut self,
        column: u32,
        row: u32,
        kind: &str,
    ) -> Result<String, JsValue> {
        let kind: CellKind = kind.parse().map_err(to_js_error)?;
        self.apply(TableCommand::ChangeCellKind {
            column: column as usize,
            row: row as usize,
            kind,
        })
        .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = changeRowKind)]
    pub fn change_row_kind(&mut self, row: u32, kind: &str) -> Result<String, JsValue> {
        let kind: CellKind = kind.parse().map_err(to_js_error)?;
        self.apply(TableCommand::ChangeRowKind {
            row: row as usize,
            kind,
        })
        .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = changeColumnKind)]
    pub fn change_column_kind(&mut self, column: u32, kind: &str) -> Result<String, JsValue> {
        let kind: CellKind = kind.parse().map_err(to_js_error)?;
        self.apply(TableCommand::ChangeColumnKind {
            column: column as usize,
            kind,
        })
        .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = setCellContent)]
    pub fn set_cell_content(
        &mut self,
        column: u32,
        row: u32,
        content: &str,
    ) -> Result<String, JsValue> {
        self.apply(TableCommand::SetCellContent {
            column: column as usize,
            row: row as usize,
            content: content.to_string(),
        })
        .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn summary(&self) -> Option<String> {
        self.editor.summary().map(str::to_string)
    }

    #[wasm_bindgen(js_name = setSummary)]
    pub fn set_summary(&mut self, summary: Option<String>) -> Result<String, JsValue> {
        self.apply(TableCommand::SetSummary { summary })
            .map_err(to_js_error)
    }

    // --- Commands and controller menu ---

    /// Run a JSON-encoded command, e.g. `{"type":"removeRow","row":1}`
    #[wasm_bindgen]
    pub fn execute(&mut self, command_json: &str) -> Result<String, JsValue> {
        self.apply_json(command_json).map_err(to_js_error)
    }

    /// JSON array of menu entries for a "row" or "column" controller
    #[wasm_bindgen(js_name = menuEntries)]
    pub fn menu_entries_json(axis: &str) -> Result<String, JsValue> {
        Self::menu_entries(axis)
            .map(|entries| to_json(&entries))
            .map_err(to_js_error)
    }

    /// Run a controller menu entry for the row or column at `index`
    #[wasm_bindgen(js_name = runMenuItem)]
    pub fn run_menu_item(&mut self, axis: &str, item: &str, index: u32) -> Result<String, JsValue> {
        self.apply_menu(axis, item, index).map_err(to_js_error)
    }

    /// Spreadsheet-style column label (A, B, ..., AA)
    #[wasm_bindgen(js_name = columnLabel)]
    pub fn column_label(index: u32) -> String {
        col_to_label(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"{
        "summary": "Stock",
        "head": [[{ "content": "Item" }, { "content": "Qty" }, { "content": "Note" }]],
        "body": [
            [{ "content": "a" }, { "content": "1" }, { "content": "x", "rowspan": 2 }],
            [{ "content": "b" }, { "content": "2" }]
        ]
    }"#;

    fn engine() -> TableEngine {
        TableEngine::create(LAYOUT, None).unwrap()
    }

    fn snapshot(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_and_snapshot() {
        let engine = engine();
        let data = engine.snapshot_data();

        assert_eq!(data.summary.as_deref(), Some("Stock"));
        assert_eq!((data.row_count, data.column_count), (3, 3));
        assert_eq!(data.rows[0].section, Section::Header);
        assert_eq!(data.rows[0].cells[0].tag, "th");
        assert_eq!(data.rows[1].cells[2].rect, Some(LogicalRect::new(1, 2, 2, 2)));

        let json = snapshot(&engine.snapshot());
        assert_eq!(json["rowCount"], 3);
        assert_eq!(json["rows"][1]["cells"][2]["rect"]["endRow"], 2);
    }

    #[test]
    fn test_create_rejects_bad_layout() {
        let err = TableEngine::create("{ not json", None).err().unwrap();
        assert_eq!(JsTableError::from(err).code, "INVALID_LAYOUT");
    }

    #[test]
    fn test_create_with_options() {
        let mut engine = TableEngine::create(LAYOUT, Some(r#"{ "joinSeparator": "+" }"#)).unwrap();
        let a = engine.snapshot_data().rows[1].cells[0].id as f64;
        let one = engine.snapshot_data().rows[1].cells[1].id as f64;

        engine.editor.pointer_down(cell_id(a).unwrap()).unwrap();
        engine.editor.pointer_move(cell_id(one).unwrap()).unwrap();
        engine.editor.pointer_up().unwrap();
        assert_eq!(engine.selected_text(), "a+1");

        let json = snapshot(&engine.apply(TableCommand::MergeSelection).unwrap());
        assert_eq!(json["rows"][1]["cells"][0]["content"], "a+1");
        assert_eq!(json["rows"][1]["cells"][0]["colspan"], 2);
        assert!(json["selection"].is_null());
    }

    #[test]
    fn test_execute_json_command() {
        let mut engine = engine();
        let json = snapshot(&engine.apply_json(r#"{"type":"removeRow","row":1}"#).unwrap());

        assert_eq!(json["rowCount"], 2);
        // The rowspan cell moved down with one row less
        assert_eq!(json["rows"][1]["cells"][2]["content"], "x");
        assert_eq!(json["rows"][1]["cells"][2]["rowspan"], 1);
    }

    #[test]
    fn test_execute_errors() {
        let mut engine = engine();

        let err = engine.apply_json(r#"{"type":"removeRow","row":9}"#).unwrap_err();
        let js = JsTableError::from(err);
        assert_eq!(js.code, "OUT_OF_RANGE");
        assert_eq!(js.message, "row index 9 out of range (0..3)");

        let err = engine.apply_json(r#"{"type":"bogus"}"#).unwrap_err();
        assert_eq!(err.code(), "INVALID_OPERATION");

        let err = engine.apply(TableCommand::MergeSelection).unwrap_err();
        assert_eq!(err.code(), "INVALID_OPERATION");
    }

    #[test]
    fn test_menu() {
        let entries = TableEngine::menu_entries("column").unwrap();
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].label, "Delete Column");
        assert!(TableEngine::menu_entries("diagonal").is_err());

        let mut engine = engine();
        let json = snapshot(&engine.apply_menu("row", "insertHeaderAfter", 0).unwrap());
        assert_eq!(json["rowCount"], 4);
        assert_eq!(json["rows"][1]["section"], "header");

        assert!(engine.apply_menu("row", "explode", 0).is_err());
    }

    #[test]
    fn test_cell_id_conversion() {
        assert_eq!(cell_id(7.0).unwrap(), CellId::new(7));
        assert_eq!(cell_id(4_294_967_296.0).unwrap(), CellId::new(1 << 32));
        assert_eq!(cell_id(MAX_SAFE_ID).unwrap().raw(), 9_007_199_254_740_991);

        for bad in [-1.0, 1.5, f64::NAN, f64::INFINITY, MAX_SAFE_ID * 2.0] {
            assert_eq!(cell_id(bad).unwrap_err().code(), "INVALID_OPERATION");
        }
    }

    #[test]
    fn test_select_range() {
        let mut engine = engine();

        // B2 sits beside the two-row note cell in C2:C3
        let json = snapshot(&engine.select_range("B2:C2").unwrap());
        assert_eq!(json["selection"]["startRow"], 1);
        assert_eq!(json["selection"]["endRow"], 2);
        assert_eq!(json["selection"]["startCol"], 1);
        assert_eq!(engine.selected_text(), "1,x,2");

        let json = snapshot(&engine.apply(TableCommand::MergeSelection).unwrap());
        assert_eq!(json["rows"][1]["cells"][1]["content"], "1,x,2");
        assert_eq!(json["rows"][1]["cells"][1]["rowspan"], 2);

        assert_eq!(engine.select_range("B0").unwrap_err().code(), "INVALID_OPERATION");
        assert_eq!(engine.select_range("A9").unwrap_err().code(), "OUT_OF_RANGE");
    }

    #[test]
    fn test_column_label() {
        assert_eq!(TableEngine::column_label(0), "A");
        assert_eq!(TableEngine::column_label(26), "AA");
    }
}
