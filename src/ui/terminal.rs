// Terminal presenter - paints view models as plain text.
//
// Every method writes to the wrapped writer and nothing else, so tests paint
// into a Vec<u8>.

use super::notifications::{Severity, Toast};
use super::renderer::{Emphasis, FileView, ResultsView, StatsView, ViolationCard, ViolationList};
use serde::Serialize;
use std::io::{self, Write};

pub struct TerminalPainter<W: Write> {
    out: W,
}

impl<W: Write> TerminalPainter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn paint_file(&mut self, file: &FileView) -> io::Result<()> {
        writeln!(self.out, "File: {} ({} MB, {})", file.name, file.size_mb, file.kind)
    }

    pub fn paint_toast(&mut self, toast: &Toast) -> io::Result<()> {
        let marker = match toast.severity {
            Severity::Error => "!",
            Severity::Success => "+",
            Severity::Processing => "~",
            Severity::Info => "*",
        };
        writeln!(self.out, "[{}] {}", marker, toast.message)
    }

    pub fn paint_results(&mut self, view: &ResultsView) -> io::Result<()> {
        writeln!(self.out, "== Summary ==")?;
        writeln!(self.out, "Total frames:      {}", view.summary.total_frames)?;
        writeln!(self.out, "Frame rate:        {}", view.summary.frame_rate)?;
        writeln!(self.out, "Violations found:  {}", view.summary.violations_found)?;

        writeln!(self.out, "== Top violations ==")?;
        self.paint_list(&view.top_violations)?;

        writeln!(self.out, "== All detections ==")?;
        self.paint_list(&view.violations)
    }

    pub fn paint_stats(&mut self, stats: &StatsView) -> io::Result<()> {
        writeln!(self.out, "== Session ==")?;
        writeln!(self.out, "Total violations:  {}", stats.total_violations)?;
        writeln!(self.out, "Runs processed:    {}", stats.runs_processed)?;
        writeln!(self.out, "Avg violations:    {}", stats.avg_violations)?;
        writeln!(self.out, "Accuracy:          {}", stats.detection_accuracy)
    }

    /// Pretty JSON followed by a newline.
    pub fn paint_json<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)
    }

    fn paint_list(&mut self, list: &ViolationList) -> io::Result<()> {
        match list {
            ViolationList::Empty { placeholder } => writeln!(self.out, "  {}", placeholder),
            ViolationList::Cards { cards } => {
                for card in cards {
                    self.paint_card(card)?;
                }
                Ok(())
            }
        }
    }

    fn paint_card(&mut self, card: &ViolationCard) -> io::Result<()> {
        let speed_marker = match card.emphasis {
            Emphasis::Alert => "!",
            Emphasis::Normal => " ",
        };
        writeln!(
            self.out,
            "  #{} [{}] frame {} @ {}s",
            card.index, card.badge, card.frame, card.timestamp
        )?;
        writeln!(
            self.out,
            "     plate {} ({})  vehicle {}",
            card.plate, card.plate_confidence, card.vehicle_confidence
        )?;
        writeln!(
            self.out,
            "    {}speed {} km/h  limit {}  excess {}",
            speed_marker, card.speed, card.speed_limit, card.excess_speed
        )
    }
}
