use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{EmailSinkConfig, RecordStoreSinkConfig, SheetsSinkConfig};

use super::payload::SubmissionPayload;
use super::report::render_report_html;
use super::sink::{SinkError, SinkReceipt, SubmissionSink};

/// Spreadsheet webhook: one POST of the flattened screening row. The webhook
/// URL carries its own credential, so success only needs a 2xx JSON reply.
pub struct SheetsWebhookSink {
    client: reqwest::Client,
    config: SheetsSinkConfig,
}

impl SheetsWebhookSink {
    pub fn new(client: reqwest::Client, config: SheetsSinkConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetsRow<'a> {
    name: &'a str,
    age: u32,
    phone: &'a str,
    sex: &'a str,
    weight: f64,
    height: f64,
    bmi: f64,
    snoring: &'a str,
    tiredness: &'a str,
    observed_apnea: &'a str,
    hypertension: &'a str,
    neck_circumference: &'a str,
    total_score: u8,
    risk_level: &'a str,
    submitted_at: String,
    session_id: &'a str,
}

#[async_trait]
impl SubmissionSink for SheetsWebhookSink {
    fn name(&self) -> &'static str {
        "sheets-webhook"
    }

    async fn send(&self, payload: &SubmissionPayload) -> Result<SinkReceipt, SinkError> {
        let url = self
            .config
            .webhook_url
            .as_deref()
            .ok_or(SinkError::Config("SHEETS_WEBHOOK_URL"))?;

        let row = SheetsRow {
            name: &payload.name,
            age: payload.age,
            phone: &payload.phone,
            sex: &payload.sex,
            weight: payload.weight_kg,
            height: payload.height_cm,
            bmi: payload.bmi,
            snoring: &payload.snoring,
            tiredness: &payload.tiredness,
            observed_apnea: &payload.observed_apnea,
            hypertension: &payload.hypertension,
            neck_circumference: &payload.neck_circumference,
            total_score: payload.raw_score,
            risk_level: &payload.risk_level,
            submitted_at: payload.metadata.submitted_at.to_rfc3339(),
            session_id: &payload.metadata.session_id,
        };

        let response = dispatch(self.client.post(url).json(&row)).await?;
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| SinkError::Malformed(err.to_string()))?;

        Ok(SinkReceipt {
            sink: self.name(),
            reference: None,
        })
    }
}

/// Email notification service: the rendered report plus routing metadata,
/// authenticated with a bearer key.
pub struct EmailNotificationSink {
    client: reqwest::Client,
    config: EmailSinkConfig,
}

impl EmailNotificationSink {
    pub fn new(client: reqwest::Client, config: EmailSinkConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailRequest<'a> {
    to: &'a str,
    from: &'a str,
    subject: String,
    html_body: String,
    tags: Vec<String>,
    priority: &'a str,
}

#[derive(Deserialize)]
struct EmailResponse {
    id: String,
}

#[async_trait]
impl SubmissionSink for EmailNotificationSink {
    fn name(&self) -> &'static str {
        "email-notification"
    }

    async fn send(&self, payload: &SubmissionPayload) -> Result<SinkReceipt, SinkError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SinkError::Config("EMAIL_API_KEY"))?;

        // The mail service speaks low/normal/high.
        let wire_priority = match payload.priority.as_str() {
            "medium" => "normal",
            other => other,
        };

        let request = EmailRequest {
            to: &self.config.notification_email,
            from: &self.config.from_email,
            subject: format!(
                "New consultation request - {} ({} priority)",
                payload.name, payload.priority
            ),
            html_body: render_report_html(payload),
            tags: vec![
                "consultation-request".to_string(),
                payload.metadata.source_tag.clone(),
                payload.priority.clone(),
            ],
            priority: wire_priority,
        };

        let response = dispatch(
            self.client
                .post(&self.config.service_url)
                .bearer_auth(api_key)
                .json(&request),
        )
        .await?;

        let parsed: EmailResponse = response
            .json()
            .await
            .map_err(|err| SinkError::Malformed(err.to_string()))?;

        Ok(SinkReceipt {
            sink: self.name(),
            reference: Some(parsed.id),
        })
    }
}

/// Record store (CRM-like): every payload field flattened 1:1 to the store's
/// column names.
pub struct RecordStoreSink {
    client: reqwest::Client,
    config: RecordStoreSinkConfig,
}

impl RecordStoreSink {
    pub fn new(client: reqwest::Client, config: RecordStoreSinkConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Deserialize)]
struct RecordStoreResponse {
    records: Vec<CreatedRecord>,
}

#[derive(Deserialize)]
struct CreatedRecord {
    id: String,
}

#[async_trait]
impl SubmissionSink for RecordStoreSink {
    fn name(&self) -> &'static str {
        "record-store"
    }

    async fn send(&self, payload: &SubmissionPayload) -> Result<SinkReceipt, SinkError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .ok_or(SinkError::Config("RECORD_STORE_BASE_URL"))?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(SinkError::Config("RECORD_STORE_API_KEY"))?;

        let url = format!("{}/{}", base_url.trim_end_matches('/'), self.config.table);
        let body = json!({
            "records": [{
                "fields": {
                    "Name": payload.name,
                    "Age": payload.age,
                    "Phone": payload.phone,
                    "Sex": payload.sex,
                    "Weight (kg)": payload.weight_kg,
                    "Height (cm)": payload.height_cm,
                    "BMI": payload.bmi,
                    "BMI Category": payload.bmi_category,
                    "Snoring": payload.snoring,
                    "Tiredness": payload.tiredness,
                    "Observed Apnea": payload.observed_apnea,
                    "Hypertension": payload.hypertension,
                    "Neck Circumference": payload.neck_circumference,
                    "Age Risk": payload.age_risk,
                    "BMI Risk": payload.bmi_risk,
                    "Sex Risk": payload.sex_risk,
                    "Total Score": payload.raw_score,
                    "Max Score": payload.max_score,
                    "Risk Level": payload.risk_level,
                    "Risk Category": payload.risk_category,
                    "Priority": payload.priority,
                    "Follow Up Needed": payload.follow_up_needed,
                    "Submitted At": payload.metadata.submitted_at.to_rfc3339(),
                    "Source": payload.metadata.source_tag,
                    "Session ID": payload.metadata.session_id,
                    "User Agent": payload.metadata.client.user_agent,
                    "Referrer": payload.metadata.client.referrer,
                }
            }]
        });

        let response =
            dispatch(self.client.post(&url).bearer_auth(api_key).json(&body)).await?;

        let parsed: RecordStoreResponse = response
            .json()
            .await
            .map_err(|err| SinkError::Malformed(err.to_string()))?;
        let reference = parsed
            .records
            .into_iter()
            .next()
            .map(|record| record.id)
            .ok_or_else(|| SinkError::Malformed("response contained no records".to_string()))?;

        Ok(SinkReceipt {
            sink: self.name(),
            reference: Some(reference),
        })
    }
}

/// Fire a prepared request and normalize transport/status failures.
async fn dispatch(request: reqwest::RequestBuilder) -> Result<reqwest::Response, SinkError> {
    let response = request
        .send()
        .await
        .map_err(|err| SinkError::Transport(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SinkError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}
