//! PDF receipt generation
//!
//! Renders the fixed-layout A4 registration receipt: school header, prominent
//! registration number, workshop/student/payment detail blocks and a QR code
//! encoding the registration number for on-site check-in scanning.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb,
};
use qrcode::QrCode;

use crate::config::Settings;
use crate::models::registration::PaymentStatus;
use crate::models::{Payment, Registration, Workshop};
use crate::utils::errors::{Result, WorkshopHubError};
use crate::utils::helpers::format_fee;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LABEL_COLUMN_MM: f32 = 55.0;

/// Everything needed to render a receipt
#[derive(Debug, Clone)]
pub struct ReceiptData {
    pub registration: Registration,
    pub workshop: Workshop,
    pub school_name: String,
    pub payment: Option<Payment>,
}

/// Filename for a downloaded receipt
pub fn receipt_filename(registration: &Registration) -> String {
    format!("receipt_{}.pdf", registration.registration_number)
}

/// Render the receipt PDF and return the document bytes
pub fn generate_receipt_pdf(data: &ReceiptData, settings: &Settings) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Receipt {}", data.registration.registration_number),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Receipt",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| WorkshopHubError::Pdf(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| WorkshopHubError::Pdf(e.to_string()))?;

    let mut writer = ReceiptWriter {
        layer: layer.clone(),
        font,
        font_bold,
        y: PAGE_HEIGHT_MM - MARGIN_MM,
    };

    // Header
    writer.centered_line(&settings.site.school_name, 22.0, true, navy());
    writer.centered_line(&settings.site.club_name, 13.0, true, navy());
    writer.centered_line("Workshop Registration Receipt", 13.0, true, navy());
    writer.space(4.0);
    writer.centered_line(
        &format!("Registration No: {}", data.registration.registration_number),
        16.0,
        true,
        crimson(),
    );
    writer.space(4.0);

    // Workshop details
    writer.heading("Workshop Details");
    writer.field("Workshop Name:", &data.workshop.name);
    writer.field("Date:", &data.workshop.workshop_date);
    writer.field("Time:", &data.workshop.time_slot);
    writer.field("Duration:", &data.workshop.duration);
    writer.field("Venue:", &data.workshop.venue);
    let organizer = if data.workshop.organizer.is_empty() {
        settings.site.club_name.as_str()
    } else {
        data.workshop.organizer.as_str()
    };
    writer.field("Organizer:", organizer);
    writer.space(3.0);

    // Student information
    writer.heading("Student Information");
    writer.field("Student Name:", &data.registration.student_name);
    writer.field("Grade:", &data.registration.grade.to_string());
    writer.field("School:", &data.school_name);
    writer.field("Contact Number:", &data.registration.contact_number);
    writer.field("Email:", &data.registration.email);
    writer.space(3.0);

    // Payment information
    writer.heading("Payment Information");
    let status_label = if data.workshop.is_free() {
        "FREE WORKSHOP".to_string()
    } else {
        PaymentStatus::parse(&data.registration.payment_status)
            .map(|s| s.display().to_string())
            .unwrap_or_else(|| data.registration.payment_status.clone())
    };
    writer.field("Workshop Fee:", &format_fee(data.workshop.fee));
    writer.field("Payment Status:", &status_label);
    writer.field(
        "Registration Date:",
        &data
            .registration
            .registered_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    );
    if let Some(payment) = &data.payment {
        writer.field("Transaction ID:", &payment.transaction_id);
        if let Some(completed_at) = payment.completed_at {
            writer.field(
                "Payment Date:",
                &completed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            );
        }
    }
    writer.space(8.0);

    // QR code for on-site scanning
    let qr_payload = format!("REG:{}", data.registration.registration_number);
    draw_qr_code(&layer, &qr_payload, &mut writer.y)?;

    // Footer
    writer.space(6.0);
    writer.centered_line(
        "This is a computer-generated receipt and does not require a signature.",
        8.0,
        false,
        grey(),
    );
    writer.centered_line(
        &format!(
            "{} | {}",
            settings.site.school_name, settings.site.club_name
        ),
        8.0,
        false,
        grey(),
    );
    writer.centered_line(
        &format!(
            "Generated on: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
        ),
        8.0,
        false,
        grey(),
    );

    doc.save_to_bytes()
        .map_err(|e| WorkshopHubError::Pdf(e.to_string()))
}

struct ReceiptWriter {
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f32,
}

impl ReceiptWriter {
    fn space(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn centered_line(&mut self, text: &str, size: f32, bold: bool, color: Color) {
        self.y -= size * 0.55;
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer.set_fill_color(color);
        // Approximate centering for Helvetica: average glyph width ~0.5em
        let text_width_mm = text.len() as f32 * size * 0.5 * 0.3528;
        let x = (PAGE_WIDTH_MM - text_width_mm).max(0.0) / 2.0;
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        self.layer.set_fill_color(black());
    }

    fn heading(&mut self, text: &str) {
        self.y -= 8.0;
        self.layer.set_fill_color(navy());
        self.layer
            .use_text(text, 13.0, Mm(MARGIN_MM), Mm(self.y), &self.font_bold);
        self.layer.set_fill_color(black());
        self.y -= 2.0;
    }

    fn field(&mut self, label: &str, value: &str) {
        self.y -= 5.5;
        self.layer
            .use_text(label, 10.0, Mm(MARGIN_MM), Mm(self.y), &self.font_bold);
        self.layer.use_text(
            value,
            10.0,
            Mm(MARGIN_MM + LABEL_COLUMN_MM),
            Mm(self.y),
            &self.font,
        );
    }
}

/// Draw the QR code centered horizontally, advancing the layout cursor
fn draw_qr_code(layer: &PdfLayerReference, payload: &str, y: &mut f32) -> Result<()> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| WorkshopHubError::Pdf(format!("QR encoding failed: {}", e)))?;
    let width = code.width();
    let colors = code.to_colors();

    let module_mm = 0.9;
    let qr_size_mm = width as f32 * module_mm;
    let origin_x = (PAGE_WIDTH_MM - qr_size_mm) / 2.0;
    let origin_y = *y - qr_size_mm;

    layer.set_fill_color(black());
    for row in 0..width {
        for col in 0..width {
            if colors[row * width + col] == qrcode::Color::Dark {
                let x = origin_x + col as f32 * module_mm;
                // PDF origin is bottom-left; QR rows count from the top
                let cell_y = origin_y + (width - 1 - row) as f32 * module_mm;
                fill_rect(layer, x, cell_y, module_mm, module_mm);
            }
        }
    }

    *y = origin_y;
    Ok(())
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32) {
    let polygon = Polygon {
        rings: vec![vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y + h)), false),
            (Point::new(Mm(x), Mm(y + h)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    };
    layer.add_polygon(polygon);
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn navy() -> Color {
    Color::Rgb(Rgb::new(0.10, 0.14, 0.49, None))
}

fn crimson() -> Color {
    Color::Rgb(Rgb::new(0.83, 0.18, 0.18, None))
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}
