use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace};

use crate::domain::{AppConfig, AppError, HELP_TEXT, Message};
use crate::inputter::{InputResult, Inputter};
use crate::table::{ProductTable, RowEntry, SortHint};
use crate::ui::{CMDLINE_HEIGH, COLUMN_WIDTH_MARGIN, HEADER_HINT_WIDTH, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

// One line of the table body. Category lines only exist while grouping
// is switched on.
enum ViewLine {
    Category(String),
    Item(usize),
}

/// A prepared body line as the UI renders it: either a full-width
/// category line or one product with pre-clipped cells.
#[derive(Debug, Clone, PartialEq)]
pub enum UIRow {
    Category { name: String },
    Item { cells: Vec<String>, stocked: bool },
}

#[derive(Debug, Clone)]
pub struct HeaderCell {
    pub label: String,
    pub width: usize,
    pub hint: Option<SortHint>,
}

pub struct UIData {
    pub name: String,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<UIRow>, // Visible window only
    pub nrows: usize,     // Total body lines of the current view
    pub nproducts: usize, // Products surviving the filter
    pub ntotal: usize,    // Products loaded, filtered or not
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub filter_text: String,
    pub in_stock_only: bool,
    pub grouped: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub last_update: Instant,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            nrows: 0,
            nproducts: 0,
            ntotal: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            filter_text: String::new(),
            in_stock_only: false,
            grouped: false,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            last_update: Instant::now(),
            cmdinput: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        // The outer frame takes one cell on each side.
        let table_width = ui_width.saturating_sub(2);
        let table_height = ui_height.saturating_sub(2 + TABLE_HEADER_HEIGHT + CMDLINE_HEIGH);

        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width,
            table_height,
            statusline_width: table_width,
            statusline_height: CMDLINE_HEIGH,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    name: String,
    table: ProductTable,
    grouped: bool,
    view: Vec<ViewLine>,
    column_widths: Vec<usize>,
    curser_row: usize,
    curser_column: usize,
    offset_row: usize,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    active_cmdinput: bool,
    pending_filter: String,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(
        config: &AppConfig,
        table: ProductTable,
        name: impl Into<String>,
        ui_width: usize,
        ui_height: usize,
    ) -> Result<Self, AppError> {
        let column_widths = Model::calculate_column_widths(&table, config.max_column_width);
        let nproducts = table.products().len();
        let mut model = Self {
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            name: name.into(),
            grouped: config.grouped,
            table,
            view: Vec::new(),
            column_widths,
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            active_cmdinput: false,
            pending_filter: String::new(),
            status_message: "Started shelf!".to_string(),
            last_status_message_update: Instant::now(),
        };
        model.input.set_width(model.uilayout.statusline_width);
        model.update_table_data();
        model.set_status_message(format!("Loaded {nproducts} products"));
        info!("Initialized model with {nproducts} products, layout {:?}", model.uilayout);
        Ok(model)
    }

    pub fn update(&mut self, message: Message) -> Result<(), AppError> {
        match self.modus {
            Modus::TABLE => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_table_selection_down(1),
                Message::MoveUp => self.move_table_selection_up(1),
                Message::MovePageUp => self.move_table_selection_up(self.uilayout.table_height + 1),
                Message::MovePageDown => {
                    self.move_table_selection_down(self.uilayout.table_height + 1)
                }
                Message::MoveBeginning => self.move_table_selection_beginning(),
                Message::MoveEnd => self.move_table_selection_end(),
                Message::MoveLeft => self.move_header_selection_left(),
                Message::MoveRight => self.move_header_selection_right(),
                Message::SortColumn => self.sort_current_column(),
                Message::RemoveSortColumn => self.remove_current_column(),
                Message::ToggleInStock => self.toggle_in_stock(),
                Message::ToggleGrouping => self.toggle_grouping(),
                Message::Filter => self.enter_filter_mode(),
                Message::CopyCell => self.copy_table_cell(),
                Message::CopyRow => self.copy_table_row(),
                Message::Help => self.show_help(),
                Message::Exit => self.clear_filter(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Quit => self.quit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Exit | Message::Help => self.exit_popup(),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = message {
                    self.raw_input(key)
                }
            }
        }

        Ok(())
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    // -------------------- Control handling functions ---------------------- //

    fn sort_current_column(&mut self) {
        let Some(column) = self.table.columns().get(self.curser_column) else {
            return;
        };
        let id = column.id.clone();
        debug!("Sorting by column {id} ...");
        match self.table.click_column(&id) {
            Ok(()) => {
                let order = self.describe_sort_order();
                self.set_status_message(format!("Sort: {order}"));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
        self.update_table_data();
    }

    fn remove_current_column(&mut self) {
        let Some(column) = self.table.columns().get(self.curser_column) else {
            return;
        };
        let id = column.id.clone();
        debug!("Retiring column {id} from the sort order ...");
        match self.table.remove_column(&id) {
            Ok(()) => {
                let order = self.describe_sort_order();
                self.set_status_message(format!("Sort: {order}"));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
        self.update_table_data();
    }

    fn describe_sort_order(&self) -> String {
        if self.table.sort_keys().is_empty() {
            return "none".to_string();
        }
        self.table
            .sort_keys()
            .iter()
            .map(|key| {
                let arrow = if key.ascending { "▲" } else { "▼" };
                format!("{}{arrow}", key.column)
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    fn toggle_in_stock(&mut self) {
        let only = !self.table.filter().in_stock_only();
        debug!("In stock only: {only}");
        self.table.set_in_stock_only(only);
        let message = if only {
            format!("Only stocked products ({})", self.table.rows().len())
        } else {
            "All products".to_string()
        };
        self.set_status_message(message);
        self.update_table_data();
    }

    fn toggle_grouping(&mut self) {
        self.grouped = !self.grouped;
        debug!("Category grouping: {}", self.grouped);
        self.update_table_data();
    }

    fn clear_filter(&mut self) {
        if self.table.filter().text().is_empty() {
            return;
        }
        self.table.set_filter_text("");
        self.set_status_message("Filter cleared".to_string());
        self.update_table_data();
    }

    fn enter_filter_mode(&mut self) {
        trace!("Entering filter input ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.active_cmdinput = true;

        // Keep the old text around so Esc can restore it.
        self.pending_filter = self.table.filter().text().to_string();
        self.input.clear();
        self.input.set(&self.pending_filter);
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.last_update = Instant::now();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if !self.active_cmdinput {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.finish_filter_input();
        } else {
            // Live preview, every keystroke narrows the table right away.
            let text = self.last_input.input.clone();
            self.table.set_filter_text(text);
        }
        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.update_table_data();
    }

    fn finish_filter_input(&mut self) {
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;

        if self.last_input.canceled {
            let pending = self.pending_filter.clone();
            self.table.set_filter_text(pending);
            self.set_status_message("Filter restored".to_string());
        } else {
            let text = self.last_input.input.clone();
            info!("Filter set to \"{text}\"");
            self.table.set_filter_text(text);
            self.set_status_message(format!("{} products match", self.table.rows().len()));
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    fn exit_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.uidata.show_popup = false;
        self.uidata.last_update = Instant::now();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.input.set_width(self.uilayout.statusline_width);
        match self.modus {
            Modus::TABLE => self.update_table_data(),
            Modus::POPUP => {}
            Modus::CMDINPUT => {}
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
        self.uidata.last_update = Instant::now();
    }

    // --------------------- Selection movement ----------------------------- //

    fn move_table_selection_beginning(&mut self) {
        self.curser_row = 0;
        self.offset_row = 0;
        self.update_table_data();
    }

    fn move_table_selection_end(&mut self) {
        let total = self.view.len();
        if total == 0 {
            return;
        }
        let height = std::cmp::max(self.uilayout.table_height, 1);
        if total < height {
            self.offset_row = 0;
            self.curser_row = total - 1;
        } else {
            self.offset_row = total - height;
            self.curser_row = height - 1;
        }
        self.update_table_data();
    }

    fn move_table_selection_up(&mut self, size: usize) {
        if self.curser_row > 0 {
            // Curser somewhere in the middle
            self.curser_row = self.curser_row.saturating_sub(size);
        } else {
            // Curser at the top, shift the window up
            if self.offset_row > 0 {
                self.offset_row = self.offset_row.saturating_sub(size);
            }
        }
        self.update_table_data();
    }

    fn move_table_selection_down(&mut self, size: usize) {
        let total = self.view.len();
        if total == 0 {
            return;
        }
        if self.curser_row + self.offset_row < total - 1 {
            let height = std::cmp::max(self.uilayout.table_height, 1);
            if self.curser_row < height - 1 {
                // Somewhere in the middle of the window
                let window = std::cmp::min(height, total - self.offset_row);
                self.curser_row = std::cmp::min(self.curser_row + size, window - 1);
            } else {
                // At the bottom, shift the window down
                self.offset_row = std::cmp::min(self.offset_row + size, total - height);
                self.curser_row = height - 1;
            }
            self.update_table_data();
        }
    }

    fn move_header_selection_left(&mut self) {
        if self.curser_column > 0 {
            self.curser_column -= 1;
            self.update_table_data();
        }
    }

    fn move_header_selection_right(&mut self) {
        if self.curser_column + 1 < self.table.columns().len() {
            self.curser_column += 1;
            self.update_table_data();
        }
    }

    // ------------------------- Clipboard ----------------------------------- //

    fn copy_table_cell(&mut self) {
        let Some(line) = self.view.get(self.offset_row + self.curser_row) else {
            return;
        };
        let cell = match line {
            ViewLine::Category(name) => name.clone(),
            ViewLine::Item(idx) => {
                let rows = self.table.rows();
                let column = &self.table.columns()[self.curser_column];
                column.field.value(rows[*idx]).to_string()
            }
        };
        trace!("Cell content: {}", cell);
        self.copy_to_clipboard(cell);
    }

    fn copy_table_row(&mut self) {
        let Some(line) = self.view.get(self.offset_row + self.curser_row) else {
            return;
        };
        let content = match line {
            ViewLine::Category(name) => Model::wrap_cell_content(name),
            ViewLine::Item(idx) => {
                let rows = self.table.rows();
                let product = rows[*idx];
                self.table
                    .columns()
                    .iter()
                    .map(|c| Model::wrap_cell_content(c.field.value(product)))
                    .collect::<Vec<String>>()
                    .join(",")
            }
        };
        self.copy_to_clipboard(content);
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace("\"", "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    // The clipboard needs a display connection, which a test runner or a
    // bare tty may not have. Create it on first use and degrade to a
    // status message when that fails.
    fn copy_to_clipboard(&mut self, content: String) {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => trace!("Clipboard unavailable: {:?}", e),
            }
        }
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(content)
                .map_err(|e| format!("{e:?}")),
            None => Err("clipboard unavailable".to_string()),
        };
        match result {
            Ok(_) => self.set_status_message("Copied to clipboard".to_string()),
            Err(e) => {
                trace!("Error copying to clipboard: {}", e);
                self.set_status_message("Clipboard unavailable".to_string());
            }
        }
    }

    // ----------------------- View derivation ------------------------------- //

    fn rebuild_view(&mut self) {
        let mut view = Vec::new();
        if self.grouped {
            let mut item_idx = 0;
            for entry in self.table.grouped_rows() {
                match entry {
                    RowEntry::Category(name) => view.push(ViewLine::Category(name.to_string())),
                    RowEntry::Item(_) => {
                        view.push(ViewLine::Item(item_idx));
                        item_idx += 1;
                    }
                }
            }
        } else {
            view.extend((0..self.table.rows().len()).map(ViewLine::Item));
        }
        self.view = view;
    }

    fn clamp_curser(&mut self) {
        let total = self.view.len();
        if total == 0 {
            self.offset_row = 0;
            self.curser_row = 0;
            return;
        }
        let height = std::cmp::max(self.uilayout.table_height, 1);
        if self.offset_row >= total {
            self.offset_row = total.saturating_sub(height);
        }
        let window = std::cmp::min(height, total - self.offset_row);
        self.curser_row = std::cmp::min(self.curser_row, window - 1);
        self.curser_column = std::cmp::min(
            self.curser_column,
            self.table.columns().len().saturating_sub(1),
        );
    }

    fn update_table_data(&mut self) {
        self.rebuild_view();
        self.clamp_curser();

        let rbegin = self.offset_row;
        let rend = std::cmp::min(rbegin + self.uilayout.table_height, self.view.len());

        trace!(
            "Table: Cr {}, Cc {}, Or {}, Rb {}, Re {}, tw: {}, th: {}",
            self.curser_row,
            self.curser_column,
            self.offset_row,
            rbegin,
            rend,
            self.uilayout.table_width,
            self.uilayout.table_height
        );

        let rows = self.table.rows();
        let window: Vec<UIRow> = self.view[rbegin..rend]
            .iter()
            .map(|line| match line {
                ViewLine::Category(name) => UIRow::Category { name: name.clone() },
                ViewLine::Item(idx) => {
                    let product = rows[*idx];
                    let cells = self
                        .table
                        .columns()
                        .iter()
                        .zip(&self.column_widths)
                        .map(|(column, &width)| {
                            Model::get_visible_cell(column.field.value(product), width)
                        })
                        .collect();
                    UIRow::Item {
                        cells,
                        stocked: product.stocked,
                    }
                }
            })
            .collect();

        self.update_uidata_for_table(window);
    }

    fn update_uidata_for_table(&mut self, window: Vec<UIRow>) {
        let headers = self
            .table
            .columns()
            .iter()
            .zip(&self.column_widths)
            .zip(self.table.header_hints())
            .map(|((column, &width), hint)| HeaderCell {
                label: column.label.clone(),
                width,
                hint,
            })
            .collect();

        self.uidata = UIData {
            name: self.name.clone(),
            headers,
            rows: window,
            nrows: self.view.len(),
            nproducts: self.table.rows().len(),
            ntotal: self.table.products().len(),
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            abs_selected_row: self.offset_row + self.curser_row,
            filter_text: self.table.filter().text().to_string(),
            in_stock_only: self.table.filter().in_stock_only(),
            grouped: self.grouped,
            show_popup: false,
            popup_message: String::new(),
            layout: self.uilayout.clone(),
            cmdinput: self.last_input.clone(),
            active_cmdinput: self.active_cmdinput,
            last_update: Instant::now(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }

    fn get_visible_cell(value: &str, width: usize) -> String {
        if width < 3 {
            return String::new();
        }
        if value.chars().count() > width {
            let mut reduced: String = value.chars().take(width - 3).collect();
            reduced.push_str("...");
            return reduced;
        }
        value.to_string()
    }

    fn calculate_column_widths(table: &ProductTable, max_column_width: usize) -> Vec<usize> {
        table
            .columns()
            .iter()
            .map(|column| {
                let widest_value = table
                    .products()
                    .iter()
                    .map(|product| column.field.value(product).chars().count())
                    .max()
                    .unwrap_or(0);
                let header = column.label.chars().count() + HEADER_HINT_WIDTH;
                let width = std::cmp::max(header, widest_value) + COLUMN_WIDTH_MARGIN;
                std::cmp::min(width, max_column_width)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{default_columns, sample_products};
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn test_model() -> Model {
        let table = ProductTable::new(sample_products(), default_columns()).unwrap();
        Model::init(&AppConfig::default(), table, "products", 80, 24).unwrap()
    }

    fn update(model: &mut Model, message: Message) {
        model.update(message).unwrap();
    }

    fn press(model: &mut Model, code: KeyCode) {
        update(
            model,
            Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)),
        );
    }

    fn item_names(uidata: &UIData) -> Vec<String> {
        uidata
            .rows
            .iter()
            .filter_map(|row| match row {
                UIRow::Item { cells, .. } => Some(cells[1].clone()),
                UIRow::Category { .. } => None,
            })
            .collect()
    }

    #[test]
    fn quit_message_sets_quitting() {
        let mut model = test_model();
        assert_eq!(model.status, Status::READY);
        update(&mut model, Message::Quit);
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn every_update_refreshes_the_snapshot() {
        let mut model = test_model();
        let before = model.get_uidata().last_update;
        update(&mut model, Message::MoveDown);
        assert!(model.get_uidata().last_update >= before);
    }

    #[test]
    fn initial_view_is_sorted_by_category() {
        let model = test_model();
        let uidata = model.get_uidata();
        assert_eq!(uidata.nrows, 6);
        assert_eq!(uidata.nproducts, 6);
        assert_eq!(
            item_names(uidata),
            ["Apple", "Dragonfruit", "Passionfruit", "Spinach", "Pumpkin", "Peas"]
        );
        assert_eq!(uidata.headers[0].hint.map(|h| h.priority), Some(0));
    }

    #[test]
    fn selection_moves_and_clamps() {
        let mut model = test_model();
        update(&mut model, Message::MoveDown);
        update(&mut model, Message::MoveDown);
        assert_eq!(model.get_uidata().abs_selected_row, 2);

        update(&mut model, Message::MoveEnd);
        assert_eq!(model.get_uidata().abs_selected_row, 5);
        update(&mut model, Message::MoveDown);
        assert_eq!(model.get_uidata().abs_selected_row, 5);

        update(&mut model, Message::MoveBeginning);
        assert_eq!(model.get_uidata().abs_selected_row, 0);
        update(&mut model, Message::MoveUp);
        assert_eq!(model.get_uidata().abs_selected_row, 0);
    }

    #[test]
    fn window_scrolls_when_the_screen_is_small() {
        let table = ProductTable::new(sample_products(), default_columns()).unwrap();
        // 7 high: 2 frame + 1 header + 1 cmdline leaves 3 body lines.
        let mut model = Model::init(&AppConfig::default(), table, "products", 80, 7).unwrap();
        assert_eq!(model.get_uidata().rows.len(), 3);

        update(&mut model, Message::MoveEnd);
        let uidata = model.get_uidata();
        assert_eq!(uidata.abs_selected_row, 5);
        assert_eq!(uidata.selected_row, 2);
        assert_eq!(item_names(uidata), ["Spinach", "Pumpkin", "Peas"]);
    }

    #[test]
    fn stock_toggle_narrows_and_restores() {
        let mut model = test_model();
        update(&mut model, Message::ToggleInStock);
        let uidata = model.get_uidata();
        assert!(uidata.in_stock_only);
        assert_eq!(uidata.nproducts, 4);
        assert_eq!(item_names(uidata), ["Apple", "Dragonfruit", "Spinach", "Peas"]);

        update(&mut model, Message::ToggleInStock);
        assert_eq!(model.get_uidata().nproducts, 6);
    }

    #[test]
    fn sort_key_cycles_on_the_selected_header() {
        let mut model = test_model();
        update(&mut model, Message::MoveRight);
        update(&mut model, Message::SortColumn);
        let uidata = model.get_uidata();
        assert_eq!(uidata.selected_column, 1);
        assert_eq!(uidata.headers[1].hint.map(|h| h.priority), Some(1));
        assert_eq!(
            item_names(uidata),
            ["Apple", "Dragonfruit", "Passionfruit", "Peas", "Pumpkin", "Spinach"]
        );

        update(&mut model, Message::SortColumn);
        let uidata = model.get_uidata();
        assert_eq!(uidata.headers[1].hint.map(|h| h.ascending), Some(false));
        assert_eq!(
            item_names(uidata),
            ["Passionfruit", "Dragonfruit", "Apple", "Spinach", "Pumpkin", "Peas"]
        );

        update(&mut model, Message::RemoveSortColumn);
        assert_eq!(model.get_uidata().headers[1].hint, None);
    }

    #[test]
    fn filter_input_previews_commits_and_restores() {
        let mut model = test_model();
        update(&mut model, Message::Filter);
        assert!(model.raw_keyevents());

        press(&mut model, KeyCode::Char('p'));
        press(&mut model, KeyCode::Char('e'));
        press(&mut model, KeyCode::Char('a'));
        // Live preview narrows before anything is committed.
        assert_eq!(item_names(model.get_uidata()), ["Peas"]);

        press(&mut model, KeyCode::Esc);
        assert!(!model.raw_keyevents());
        assert_eq!(model.get_uidata().nproducts, 6);
        assert_eq!(model.get_uidata().filter_text, "");

        update(&mut model, Message::Filter);
        press(&mut model, KeyCode::Char('f'));
        press(&mut model, KeyCode::Enter);
        assert!(!model.raw_keyevents());
        let uidata = model.get_uidata();
        assert_eq!(uidata.filter_text, "f");
        assert_eq!(item_names(uidata), ["Dragonfruit", "Passionfruit"]);

        // Esc in table modus clears a committed filter.
        update(&mut model, Message::Exit);
        assert_eq!(model.get_uidata().nproducts, 6);
    }

    #[test]
    fn reentering_filter_mode_preloads_the_current_text() {
        let mut model = test_model();
        update(&mut model, Message::Filter);
        press(&mut model, KeyCode::Char('p'));
        press(&mut model, KeyCode::Enter);

        update(&mut model, Message::Filter);
        assert_eq!(model.get_uidata().cmdinput.input, "p");
        press(&mut model, KeyCode::Backspace);
        press(&mut model, KeyCode::Esc);
        assert_eq!(model.get_uidata().filter_text, "p");
    }

    #[test]
    fn grouping_inserts_category_lines() {
        let mut model = test_model();
        update(&mut model, Message::ToggleGrouping);
        let uidata = model.get_uidata();
        assert!(uidata.grouped);
        assert_eq!(uidata.nrows, 8);
        assert_eq!(
            uidata.rows[0],
            UIRow::Category {
                name: "Fruits".to_string()
            }
        );
        match &uidata.rows[1] {
            UIRow::Item { cells, stocked } => {
                assert_eq!(cells[1], "Apple");
                assert!(stocked);
            }
            UIRow::Category { .. } => panic!("expected a product line"),
        }

        update(&mut model, Message::ToggleGrouping);
        assert_eq!(model.get_uidata().nrows, 6);
    }

    #[test]
    fn filter_shrink_keeps_the_curser_in_range() {
        let mut model = test_model();
        update(&mut model, Message::MoveEnd);
        update(&mut model, Message::Filter);
        press(&mut model, KeyCode::Char('p'));
        press(&mut model, KeyCode::Char('e'));
        let uidata = model.get_uidata();
        assert_eq!(uidata.nrows, 1);
        assert!(uidata.abs_selected_row < uidata.nrows);
    }

    #[test]
    fn header_selection_stops_at_the_edges() {
        let mut model = test_model();
        update(&mut model, Message::MoveLeft);
        assert_eq!(model.get_uidata().selected_column, 0);
        update(&mut model, Message::MoveRight);
        update(&mut model, Message::MoveRight);
        update(&mut model, Message::MoveRight);
        assert_eq!(model.get_uidata().selected_column, 2);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = test_model();
        update(&mut model, Message::Help);
        let uidata = model.get_uidata();
        assert!(uidata.show_popup);
        assert!(uidata.popup_message.contains("quit"));

        // Movement is ignored while the popup is up.
        update(&mut model, Message::MoveDown);
        assert_eq!(model.get_uidata().abs_selected_row, 0);

        update(&mut model, Message::Exit);
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn resize_reshapes_the_window() {
        let mut model = test_model();
        update(&mut model, Message::Resize(60, 8));
        let uidata = model.get_uidata();
        assert_eq!(uidata.layout.table_height, 4);
        assert_eq!(uidata.rows.len(), 4);
    }

    #[test]
    fn status_messages_reflect_the_last_action() {
        let mut model = test_model();
        update(&mut model, Message::ToggleInStock);
        assert_eq!(model.get_uidata().status_message, "Only stocked products (4)");
        update(&mut model, Message::SortColumn);
        assert_eq!(model.get_uidata().status_message, "Sort: category▼");
    }

    #[test]
    fn long_values_are_clipped_with_an_ellipsis() {
        assert_eq!(Model::get_visible_cell("Dragonfruit", 11), "Dragonfruit");
        assert_eq!(Model::get_visible_cell("Dragonfruit", 8), "Drago...");
        assert_eq!(Model::get_visible_cell("Dragonfruit", 2), "");
    }

    #[test]
    fn wrapped_cells_are_csv_safe() {
        assert_eq!(Model::wrap_cell_content("Apple"), "Apple");
        assert_eq!(Model::wrap_cell_content("red apple"), "\"red apple\"");
        assert_eq!(Model::wrap_cell_content("a \"b\""), "\"a \"\"b\"\"\"");
    }
}
