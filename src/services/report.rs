//! HTML inspection report rendering.
//!
//! The report is a standalone HTML document built from already-fetched
//! rows. Values are HTML-escaped; the `na` helper prints "N/A" for missing
//! values.

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, html_escape,
};
use serde_json::{Value, json};

use crate::error::{AppError, AppResult};
use crate::models::{
    ComponentCondition, Inspection, InspectionComponent, Photo, PhotoStep, RequiredActionRow,
    TestFluid, Valve,
};

const TEMPLATE_NAME: &str = "inspection_report";
const TEMPLATE: &str = include_str!("../../templates/inspection_report.hbs");

/// Rows making up one report.
#[derive(Debug, Clone)]
pub struct InspectionReport {
    pub valve: Valve,
    pub inspection: Inspection,
    pub components: Vec<InspectionComponent>,
    pub actions: Vec<RequiredActionRow>,
    pub photos: Vec<Photo>,
}

pub struct ReportRenderer {
    handlebars: Handlebars<'static>,
}

impl ReportRenderer {
    pub fn new() -> AppResult<Self> {
        Self::from_template(TEMPLATE)
    }

    fn from_template(source: &str) -> AppResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_helper("na", Box::new(NotAvailableHelper));
        handlebars
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| AppError::Internal(format!("Invalid report template: {}", e)))?;

        Ok(Self { handlebars })
    }

    pub fn render(&self, report: &InspectionReport) -> AppResult<String> {
        self.handlebars
            .render(TEMPLATE_NAME, &view_model(report))
            .map_err(|e| AppError::Internal(format!("Report render error: {}", e)))
    }
}

/// Print the value, or "N/A" when it is null or blank.
struct NotAvailableHelper;

impl HelperDef for NotAvailableHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = match h.param(0).map(|p| p.value()) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => "N/A".to_string(),
        };
        out.write(&html_escape(&text))?;
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "Sim" } else { "Não" }
}

fn view_model(report: &InspectionReport) -> Value {
    let valve = &report.valve;
    let inspection = &report.inspection;

    let outcome = match (inspection.completed_at, inspection.approved) {
        (None, _) => "Em andamento",
        (Some(_), Some(false)) => "Reprovada",
        (Some(_), _) => "Aprovada",
    };

    let components: Vec<Value> = report
        .components
        .iter()
        .map(|c| {
            let condition = c
                .condition
                .as_deref()
                .map(|raw| ComponentCondition::parse(raw).map_or(raw, |cond| cond.label()));
            json!({
                "component": c.component,
                "condition": condition,
                "condition_code": c.condition_code,
                "age": c.age,
                "note": c.note,
            })
        })
        .collect();

    let actions: Vec<Value> = report
        .actions
        .iter()
        .map(|a| json!({ "action": a.action, "note": a.note }))
        .collect();

    json!({
        "valve": {
            "tag": valve.tag,
            "manufacturer": valve.manufacturer,
            "model": valve.model,
            "serial_number": valve.serial_number,
            "diameter": valve.diameter,
            "set_pressure": valve.set_pressure,
            "fluid": valve.fluid,
            "location": valve.location,
        },
        "inspection": {
            "kind": inspection.kind.label(),
            "started_on": inspection.started_at.map(|d| d.format("%d/%m/%Y").to_string()),
            "completed_on": inspection.completed_at.map(|d| d.format("%d/%m/%Y").to_string()),
            "instruments_used": inspection.instruments_used,
            "cdtp": inspection.cdtp,
            "test_fluid": inspection.test_fluid.map(|f| match f {
                TestFluid::Liquido => "Líquido",
                TestFluid::Gasoso => "Gasoso",
            }),
            "seal_code": inspection.seal_code,
            "joint_integrity_test": yes_no(inspection.joint_integrity_test),
            "leak_test": yes_no(inspection.leak_test),
            "vr_seal": yes_no(inspection.vr_seal),
            "observations": inspection.observations,
            "outcome": outcome,
        },
        "components": components,
        "actions": actions,
        "photo_groups": photo_groups(&report.photos),
    })
}

/// Photos grouped by stage in wizard order. Unknown stages go last.
fn photo_groups(photos: &[Photo]) -> Vec<Value> {
    let mut sorted: Vec<&Photo> = photos.iter().collect();
    sorted.sort_by_key(|p| {
        PhotoStep::parse(&p.step)
            .map(|s| s.ordinal())
            .unwrap_or(usize::MAX)
    });

    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    for photo in sorted {
        let title = PhotoStep::parse(&photo.step)
            .map(|s| s.title().to_string())
            .unwrap_or_else(|| photo.step.clone());
        let entry = json!({
            "url": photo.url,
            "filename": photo.filename,
            "caption": photo.caption.as_deref().filter(|c| !c.trim().is_empty()),
        });
        match groups.last_mut() {
            Some((last, items)) if *last == title => items.push(entry),
            _ => groups.push((title, vec![entry])),
        }
    }

    groups
        .into_iter()
        .map(|(title, photos)| json!({ "title": title, "photos": photos }))
        .collect()
}
