use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

use crate::db::assignments::ReminderTarget;

pub fn reminder_subject(target: &ReminderTarget) -> String {
    format!(
        "Reminder: {} on {}",
        target.assignment_type.display_name(),
        target.assignment_date.format("%A %-d %B %Y")
    )
}

pub fn reminder_body(target: &ReminderTarget) -> String {
    let mut body = format!(
        "Hello {name},\n\n\
         You are on the roster for the {event} on {date}.\n\n\
         Location: {location}\n\
         Role: {role}\n",
        name = target.member_name,
        event = target.assignment_type.display_name(),
        date = target.assignment_date.format("%A %-d %B %Y"),
        location = or_dash(&target.location),
        role = or_dash(&target.role),
    );
    if let Some(notes) = &target.notes {
        body.push_str(&format!("Notes: {notes}\n"));
    }
    body.push_str(
        "\nIf you can no longer make it, please let the roster coordinator know.\n",
    );
    body
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

pub async fn send_assignment_reminder(
    ses: &SesClient,
    from: &str,
    target: &ReminderTarget,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let subject = Content::builder().data(reminder_subject(target)).build()?;

    let body = Body::builder()
        .text(Content::builder().data(reminder_body(target)).build()?)
        .build();

    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(&target.email).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;

    tracing::info!(
        to = %target.email,
        member = %target.member_name,
        date = %target.assignment_date,
        "Assignment reminder sent"
    );
    Ok(())
}
