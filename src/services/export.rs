//! Excel export for the admin panel
//!
//! Writes the filtered registration, workshop and payment listings into .xlsx
//! workbooks with a styled header row and auto-sized columns, matching the
//! layout administrators use for attendance and reconciliation sheets.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::database::{PaymentExportRow, RegistrationExportRow, WorkshopExportRow};
use crate::models::registration::PaymentStatus;
use crate::utils::errors::{Result, WorkshopHubError};

const HEADER_COLOR: u32 = 0x36_60_92;
const MAX_COLUMN_WIDTH: f64 = 50.0;

/// MIME type for xlsx downloads
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const REGISTRATION_HEADERS: [&str; 11] = [
    "Registration Number",
    "Workshop",
    "Workshop Date",
    "Student Name",
    "Grade",
    "School",
    "Contact",
    "Email",
    "Payment Status",
    "Fee",
    "Registered Date",
];

const WORKSHOP_HEADERS: [&str; 10] = [
    "Name",
    "Date",
    "Time",
    "Duration",
    "Venue",
    "Organizer",
    "Fee",
    "Capacity",
    "Confirmed",
    "Total Registrations",
];

const PAYMENT_HEADERS: [&str; 10] = [
    "Transaction ID",
    "Registration Number",
    "Student Name",
    "Workshop",
    "Amount",
    "Currency",
    "Status",
    "Method",
    "Initiated",
    "Completed",
];

/// Build the registrations workbook and return the xlsx bytes
pub fn registrations_to_xlsx(rows: &[RegistrationExportRow]) -> Result<Vec<u8>> {
    let mut sheet = ExportSheet::new("Registrations", &REGISTRATION_HEADERS)?;

    for reg in rows {
        let status = status_label(&reg.payment_status);
        let registered = reg.registered_at.format("%Y-%m-%d %H:%M:%S").to_string();

        sheet.string(0, &reg.registration_number)?;
        sheet.string(1, &reg.workshop_name)?;
        sheet.string(2, &reg.workshop_date)?;
        sheet.string(3, &reg.student_name)?;
        sheet.number(4, reg.grade as f64, 2)?;
        sheet.string(5, &reg.school_name)?;
        sheet.string(6, &reg.contact_number)?;
        sheet.string(7, &reg.email)?;
        sheet.string(8, &status)?;
        sheet.decimal(9, reg.fee)?;
        sheet.string(10, &registered)?;
        sheet.next_row();
    }

    sheet.finish()
}

/// Build the workshops workbook and return the xlsx bytes
pub fn workshops_to_xlsx(rows: &[WorkshopExportRow]) -> Result<Vec<u8>> {
    let mut sheet = ExportSheet::new("Workshops", &WORKSHOP_HEADERS)?;

    for workshop in rows {
        sheet.string(0, &workshop.name)?;
        sheet.string(1, &workshop.workshop_date)?;
        sheet.string(2, &workshop.time_slot)?;
        sheet.string(3, &workshop.duration)?;
        sheet.string(4, &workshop.venue)?;
        sheet.string(5, &workshop.organizer)?;
        sheet.decimal(6, workshop.fee)?;
        sheet.number(7, workshop.capacity as f64, 4)?;
        sheet.number(8, workshop.confirmed_registrations as f64, 4)?;
        sheet.number(9, workshop.total_registrations as f64, 4)?;
        sheet.next_row();
    }

    sheet.finish()
}

/// Build the payments workbook and return the xlsx bytes
pub fn payments_to_xlsx(rows: &[PaymentExportRow]) -> Result<Vec<u8>> {
    let mut sheet = ExportSheet::new("Payments", &PAYMENT_HEADERS)?;

    for payment in rows {
        let status = status_label(&payment.payment_status);
        let initiated = payment.initiated_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let completed = payment
            .completed_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        sheet.string(0, &payment.transaction_id)?;
        sheet.string(1, &payment.registration_number)?;
        sheet.string(2, &payment.student_name)?;
        sheet.string(3, &payment.workshop_name)?;
        sheet.decimal(4, payment.amount)?;
        sheet.string(5, &payment.currency)?;
        sheet.string(6, &status)?;
        sheet.string(7, &payment.payment_method)?;
        sheet.string(8, &initiated)?;
        sheet.string(9, &completed)?;
        sheet.next_row();
    }

    sheet.finish()
}

fn status_label(raw: &str) -> String {
    PaymentStatus::parse(raw)
        .map(|s| s.display().to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// One worksheet with the styled header row and width tracking
struct ExportSheet {
    workbook: Workbook,
    row: u32,
    column_widths: Vec<usize>,
}

impl ExportSheet {
    fn new(name: &str, headers: &[&str]) -> Result<Self> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name).map_err(export_err)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_COLOR))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        for (col, header) in headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &header_format)
                .map_err(export_err)?;
        }

        Ok(Self {
            workbook,
            row: 1,
            column_widths: headers.iter().map(|h| h.len()).collect(),
        })
    }

    fn sheet(&mut self) -> &mut Worksheet {
        // The single worksheet created in new()
        &mut self.workbook.worksheets_mut()[0]
    }

    fn string(&mut self, col: u16, value: &str) -> Result<()> {
        let row = self.row;
        self.sheet().write_string(row, col, value).map_err(export_err)?;
        self.track_width(col, value.len());
        Ok(())
    }

    /// Write a numeric cell, tracking an approximate rendered width
    fn number(&mut self, col: u16, value: f64, width_hint: usize) -> Result<()> {
        let row = self.row;
        self.sheet().write_number(row, col, value).map_err(export_err)?;
        self.track_width(col, width_hint);
        Ok(())
    }

    fn decimal(&mut self, col: u16, value: rust_decimal::Decimal) -> Result<()> {
        let rendered = value.to_string();
        let number = value.to_f64().unwrap_or(0.0);
        self.number(col, number, rendered.len())
    }

    fn next_row(&mut self) {
        self.row += 1;
    }

    fn track_width(&mut self, col: u16, len: usize) {
        let col = col as usize;
        self.column_widths[col] = self.column_widths[col].max(len);
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        for (col, width) in self.column_widths.clone().into_iter().enumerate() {
            let width = ((width + 2) as f64).min(MAX_COLUMN_WIDTH);
            self.sheet()
                .set_column_width(col as u16, width)
                .map_err(export_err)?;
        }

        self.workbook.save_to_buffer().map_err(export_err)
    }
}

fn export_err(e: rust_xlsxwriter::XlsxError) -> WorkshopHubError {
    WorkshopHubError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sample_registration() -> RegistrationExportRow {
        RegistrationExportRow {
            registration_number: "REG-20251210-AB12C".to_string(),
            workshop_name: "PROJECT DISPLAY & PRESENTATION Workshop".to_string(),
            workshop_date: "10 & 11 December 2025".to_string(),
            student_name: "Ayesha Rahman".to_string(),
            grade: 9,
            school_name: "St. Joseph International School".to_string(),
            contact_number: "01712345678".to_string(),
            email: "ayesha@example.com".to_string(),
            payment_status: "completed".to_string(),
            fee: Decimal::new(20000, 2),
            registered_at: Utc::now(),
        }
    }

    fn sample_payment() -> PaymentExportRow {
        PaymentExportRow {
            transaction_id: "TXN-REG-20251210-AB12C-1A2B3C4D".to_string(),
            registration_number: "REG-20251210-AB12C".to_string(),
            student_name: "Ayesha Rahman".to_string(),
            workshop_name: "PROJECT DISPLAY & PRESENTATION Workshop".to_string(),
            amount: Decimal::new(20000, 2),
            currency: "BDT".to_string(),
            payment_status: "completed".to_string(),
            payment_method: "sslcommerz".to_string(),
            initiated_at: Utc::now(),
            completed_at: Some(Utc::now()),
        }
    }

    fn sample_workshop() -> WorkshopExportRow {
        WorkshopExportRow {
            id: 1,
            name: "ARDUINO ROBOTICS BOOTCAMP".to_string(),
            workshop_date: "15 December 2025".to_string(),
            time_slot: "9:45 AM - 12:30 PM".to_string(),
            duration: "2 hours 45 minutes".to_string(),
            venue: "New building".to_string(),
            organizer: "2 teams from Zan Tech".to_string(),
            fee: Decimal::ZERO,
            capacity: 120,
            is_active: true,
            total_registrations: 45,
            confirmed_registrations: 40,
        }
    }

    #[test]
    fn test_empty_export_is_valid_workbook() {
        let bytes = registrations_to_xlsx(&[]).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_registration_export_with_rows() {
        let rows = vec![sample_registration(), sample_registration()];
        let bytes = registrations_to_xlsx(&rows).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_registration_export_tracks_wide_fee_column() {
        // A fee wider than the header must not clip the column
        let mut row = sample_registration();
        row.fee = Decimal::new(12_345_678_901, 2);
        let bytes = registrations_to_xlsx(&[row]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_workshop_export_with_rows() {
        let bytes = workshops_to_xlsx(&[sample_workshop()]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_payment_export_with_rows() {
        let mut open = sample_payment();
        open.payment_status = "pending".to_string();
        open.completed_at = None;

        let bytes = payments_to_xlsx(&[sample_payment(), open]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
