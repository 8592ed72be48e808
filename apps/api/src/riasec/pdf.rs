//! RIASEC result report rendered as an A4 PDF with the built-in Helvetica faces.

use chrono::NaiveDate;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::errors::AppError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const TOP_Y: f32 = PAGE_HEIGHT - 25.0;
const BOTTOM_Y: f32 = 25.0;
/// Helvetica characters per line at 10pt over the full text width.
const WRAP_COLUMNS: usize = 95;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

pub struct ReportProgram {
    pub name: String,
    pub level: String,
    pub department: String,
    pub university: Option<String>,
    pub duration_years: Option<i32>,
    pub total_score: i32,
    pub master_name: Option<String>,
    pub master_duration_years: Option<i32>,
}

pub struct ReportCareers {
    pub code: char,
    pub name: String,
    pub description: String,
    pub careers: Vec<String>,
}

pub struct RiasecReport {
    pub first_name: String,
    pub last_name: String,
    pub profile_details: Vec<(String, String)>,
    pub holland_code: String,
    pub test_date: NaiveDate,
    /// (dimension name, score), highest first
    pub scores: Vec<(String, i32)>,
    pub careers: Vec<ReportCareers>,
    pub programs: Vec<ReportProgram>,
    pub generated_on: NaiveDate,
}

/// Built-in PDF fonts only cover WinAnsi; fold French diacritics to ASCII.
pub fn ascii_fold(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'À' | 'Â' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'î' | 'ï' => 'i',
            'Î' | 'Ï' => 'I',
            'ô' | 'ö' => 'o',
            'Ô' | 'Ö' => 'O',
            'ù' | 'û' | 'ü' => 'u',
            'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            '’' | '‘' => '\'',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

/// `RIASEC_{first}_{last}_{YYYYMMDD}.pdf`, safe for a Content-Disposition header.
pub fn report_filename(first_name: &str, last_name: &str, date: NaiveDate) -> String {
    let clean = |s: &str| {
        ascii_fold(s.trim())
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect::<String>()
    };
    format!(
        "RIASEC_{}_{}_{}.pdf",
        clean(first_name),
        clean(last_name),
        date.format("%Y%m%d")
    )
}

/// Line capacity for `size` points, shrinking with the indent.
fn columns_for(size: f32, indent: f32) -> usize {
    let scale = (10.0 / size) * ((TEXT_WIDTH - indent) / TEXT_WIDTH);
    ((WRAP_COLUMNS as f32 * scale) as usize).max(10)
}

fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("pdf rendering failed: {e}"))
}

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    page: u32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        let mut writer = PageWriter {
            doc,
            layer,
            regular,
            bold,
            y: TOP_Y,
            page: 1,
        };
        writer.footer();
        Ok(writer)
    }

    fn footer(&self) {
        self.layer.use_text("OrientCam", 9.0, Mm(MARGIN_X), Mm(13.0), &self.regular);
        self.layer.use_text(
            format!("Page {}", self.page),
            9.0,
            Mm(PAGE_WIDTH - MARGIN_X - 15.0),
            Mm(13.0),
            &self.regular,
        );
        if self.page > 1 {
            self.layer.use_text(
                "Resultats du Test RIASEC - OrientCam",
                9.0,
                Mm(MARGIN_X),
                Mm(PAGE_HEIGHT - 15.0),
                &self.regular,
            );
        }
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed >= BOTTOM_Y {
            return;
        }
        self.page += 1;
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", self.page));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP_Y;
        self.footer();
    }

    fn line(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        let height = size * 0.45 + 1.5;
        self.ensure_space(height);
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(ascii_fold(text), size, Mm(MARGIN_X + indent), Mm(self.y), font);
        self.y -= height;
    }

    fn paragraph(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        for line in wrap(text, columns_for(size, indent)) {
            self.line(&line, size, bold, indent);
        }
    }

    fn heading(&mut self, text: &str) {
        self.gap(4.0);
        self.ensure_space(20.0);
        self.line(text, 14.0, true, 0.0);
        self.gap(1.5);
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn finish(self) -> Result<Vec<u8>, AppError> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

pub fn render_report(report: &RiasecReport) -> Result<Vec<u8>, AppError> {
    let mut w = PageWriter::new("Resultats du test RIASEC")?;

    w.line("ORIENTCAM", 26.0, true, 0.0);
    w.line("RÉSULTATS DU TEST RIASEC", 16.0, true, 0.0);
    w.line(
        &format!("Généré le {}", report.generated_on.format("%d/%m/%Y")),
        9.0,
        false,
        0.0,
    );

    w.heading("Informations de l'étudiant");
    w.line(
        &format!("Nom : {} {}", report.first_name, report.last_name),
        11.0,
        false,
        0.0,
    );
    for (label, value) in &report.profile_details {
        w.paragraph(&format!("{label} : {value}"), 11.0, false, 0.0);
    }
    w.line(
        &format!("Date du test : {}", report.test_date.format("%d/%m/%Y")),
        11.0,
        false,
        0.0,
    );

    w.heading("Votre code Holland");
    w.line(&report.holland_code, 22.0, true, 0.0);

    w.heading("Scores par dimension");
    for (name, score) in &report.scores {
        w.line(&format!("{name:<16} {score:>3} %"), 11.0, false, 0.0);
    }

    w.heading("Métiers correspondant à votre profil");
    for entry in &report.careers {
        w.gap(1.0);
        w.paragraph(&format!("{} - {}", entry.code, entry.name), 12.0, true, 0.0);
        w.paragraph(&entry.description, 10.0, false, 0.0);
        for career in &entry.careers {
            w.paragraph(&format!("- {career}"), 10.0, false, 5.0);
        }
    }

    if !report.programs.is_empty() {
        w.heading("Programmes recommandés");
        for program in &report.programs {
            w.gap(1.0);
            w.paragraph(
                &format!("{} ({}) - {} %", program.name, program.level, program.total_score),
                11.0,
                true,
                0.0,
            );
            let mut details = program.department.clone();
            if let Some(university) = &program.university {
                details.push_str(&format!(" - {university}"));
            }
            if let Some(years) = program.duration_years {
                details.push_str(&format!(" - {years} ans"));
            }
            w.paragraph(&details, 10.0, false, 5.0);
            if let Some(master) = &program.master_name {
                let years = program
                    .master_duration_years
                    .map(|y| format!(" ({y} ans)"))
                    .unwrap_or_default();
                w.paragraph(&format!("Poursuite en Master : {master}{years}"), 10.0, false, 5.0);
            }
        }
    }

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(programs: usize) -> RiasecReport {
        RiasecReport {
            first_name: "Awa".into(),
            last_name: "Ngono".into(),
            profile_details: vec![("Ville".into(), "Bertoua".into())],
            holland_code: "ISA".into(),
            test_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            scores: vec![("Investigateur".into(), 88), ("Social".into(), 76)],
            careers: vec![ReportCareers {
                code: 'I',
                name: "Investigateur".into(),
                description: "Personnes curieuses qui aiment observer, analyser et comprendre. ".repeat(4),
                careers: vec!["Médecin".into(), "Chimiste".into()],
            }],
            programs: (0..programs)
                .map(|i| ReportProgram {
                    name: format!("Licence {i}"),
                    level: "Licence".into(),
                    department: "Informatique".into(),
                    university: Some("Université de Bertoua".into()),
                    duration_years: Some(3),
                    total_score: 70,
                    master_name: Some("Master Informatique".into()),
                    master_duration_years: Some(2),
                })
                .collect(),
            generated_on: NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_report(&report(2)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_reports_paginate() {
        let short = render_report(&report(1)).unwrap();
        let long = render_report(&report(80)).unwrap();
        assert!(long.len() > short.len());
    }

    #[test]
    fn test_ascii_fold() {
        assert_eq!(ascii_fold("Réaliste à côté, Ça"), "Realiste a cote, Ca");
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            report_filename("Éloïse", "Mbarga Owona", date),
            "RIASEC_Eloise_Mbarga_Owona_20240305.pdf"
        );
    }

    #[test]
    fn test_columns_shrink_with_size_and_indent() {
        assert_eq!(columns_for(10.0, 0.0), WRAP_COLUMNS);
        assert!(columns_for(11.0, 0.0) < WRAP_COLUMNS);
        assert!(columns_for(10.0, 5.0) < WRAP_COLUMNS);
        assert!(columns_for(12.0, 0.0) < columns_for(11.0, 0.0));
    }

    #[test]
    fn test_long_program_names_wrap() {
        let name = "Licence professionnelle en Gestion des Ressources Humaines et Management des Organisations Publiques et Privees (Licence) - 82 %";
        let columns = columns_for(11.0, 0.0);
        let lines = wrap(name, columns);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= columns));

        let mut long = report(1);
        long.programs[0].name = name.to_string();
        long.programs[0].department = "Departement des Sciences Economiques et de Gestion Appliquee".repeat(2);
        assert!(render_report(&long).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_respects_columns() {
        let lines = wrap(&"mot ".repeat(60), 20);
        assert!(lines.iter().all(|l| l.len() <= 20));
        assert_eq!(lines.join(" ").split(' ').count(), 60);
    }
}
