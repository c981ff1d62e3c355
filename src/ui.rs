use std::time::Duration;

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

use crate::domain::AppConfig;
use crate::model::{Model, UIData, UIRow};

pub const CMDLINE_HEIGH: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 2;
// Room for the direction arrow and priority digit behind a header label.
pub const HEADER_HINT_WIDTH: usize = 3;

#[derive(Debug)]
pub struct TableUI {
    config: AppConfig,
}

struct TableWidget<'a> {
    ui: &'a TableUI,
    data: &'a UIData,
}

impl TableUI {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let data = model.get_uidata();
        frame.render_widget(TableWidget { ui: self, data }, frame.area());
    }
}

impl Widget for TableWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let data = self.data;

        let mut title_spans = vec![format!(" {} ", data.name).bold()];
        if data.in_stock_only {
            title_spans.push("[in stock] ".yellow());
        }
        if !data.filter_text.is_empty() {
            title_spans.push(format!("/{} ", data.filter_text).yellow());
        }
        let title = Line::from(title_spans);
        let counter = Line::from(
            format!(" {}/{} products ", data.nproducts, data.ntotal).bold(),
        )
        .right_aligned();

        let instructions = Line::from(vec![
            " Quit ".into(),
            "<Q>".blue().bold(),
            " Help ".into(),
            "<?> ".blue().bold(),
        ]);
        let block = Block::bordered()
            .title(title)
            .title(counter)
            .title_bottom(instructions.centered())
            .border_set(border::THICK);

        let inner = block.inner(area);
        block.render(area, buf);

        let chrome = (TABLE_HEADER_HEIGHT + CMDLINE_HEIGH) as u16;
        if inner.width == 0 || inner.height <= chrome {
            return;
        }

        let header_area = Rect {
            height: TABLE_HEADER_HEIGHT as u16,
            ..inner
        };
        let body_area = Rect {
            y: inner.y + TABLE_HEADER_HEIGHT as u16,
            height: inner.height - chrome,
            ..inner
        };
        let cmd_area = Rect {
            y: inner.y + inner.height - CMDLINE_HEIGH as u16,
            height: CMDLINE_HEIGH as u16,
            ..inner
        };

        self.render_header(header_area, buf);
        self.render_body(body_area, buf);
        self.render_cmdline(cmd_area, buf);

        if data.show_popup {
            self.render_popup(area, buf);
        }
    }
}

impl TableWidget<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let mut spans: Vec<Span> = Vec::new();
        for (idx, header) in self.data.headers.iter().enumerate() {
            let mut label = header.label.clone();
            if let Some(hint) = header.hint {
                let arrow = if hint.ascending { '▲' } else { '▼' };
                label.push(' ');
                label.push(arrow);
                label.push_str(&(hint.priority + 1).to_string());
            }
            let text = format!("{label:<width$} ", width = header.width);
            let mut span = if header.hint.is_some() {
                text.cyan().bold()
            } else {
                text.bold()
            };
            if idx == self.data.selected_column {
                span = span.underlined();
            }
            spans.push(span);
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_body(&self, area: Rect, buf: &mut Buffer) {
        if self.data.rows.is_empty() {
            Paragraph::new(Line::from("No matching products".dim().italic())).render(area, buf);
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        for (idx, row) in self.data.rows.iter().enumerate() {
            let mut line = match row {
                UIRow::Category { name } => Line::from(name.clone().bold().italic()),
                UIRow::Item { cells, stocked } => {
                    let spans: Vec<Span> = cells
                        .iter()
                        .zip(&self.data.headers)
                        .map(|(cell, header)| {
                            Span::from(format!("{cell:<width$} ", width = header.width))
                        })
                        .collect();
                    let line = Line::from(spans);
                    if *stocked { line } else { line.red() }
                }
            };
            if idx == self.data.selected_row {
                line = line.reversed();
            }
            lines.push(line);
        }
        Paragraph::new(Text::from(lines)).render(area, buf);
    }

    fn render_cmdline(&self, area: Rect, buf: &mut Buffer) {
        let line = if self.data.active_cmdinput {
            let input = &self.data.cmdinput.input;
            let pos = self.data.cmdinput.curser_pos;
            let before: String = input.chars().take(pos).collect();
            let at: String = input.chars().skip(pos).take(1).collect();
            let after: String = input.chars().skip(pos + 1).collect();
            let at = if at.is_empty() { " ".to_string() } else { at };
            Line::from(vec![
                "/".bold(),
                Span::from(before),
                Span::from(at).reversed(),
                Span::from(after),
            ])
        } else if self.data.last_status_message_update.elapsed()
            < Duration::from_secs(self.ui.config.status_message_timeout)
        {
            Line::from(self.data.status_message.clone().yellow())
        } else {
            Line::from(format!(" {}/{} ", self.data.abs_selected_row + 1, self.data.nrows).dim())
        };
        Paragraph::new(line).render(area, buf);
    }

    fn render_popup(&self, area: Rect, buf: &mut Buffer) {
        let popup_area = centered_area(area, 74, 17);
        Clear.render(popup_area, buf);
        let block = Block::bordered().title(" Help ".bold());
        Paragraph::new(self.data.popup_message.clone())
            .block(block)
            .render(popup_area, buf);
    }
}

fn centered_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = std::cmp::min(width, area.width);
    let height = std::cmp::min(height, area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}
