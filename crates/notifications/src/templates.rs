//! Message templates for account and booking events.

use crate::message::{EmailMessage, WhatsAppMessage};

/// Everything the booking confirmation templates render.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub user_name: String,
    pub reference: String,
    pub turf_name: String,
    pub location: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
    pub total_price: f64,
    pub amenities: Vec<String>,
}

impl BookingConfirmation {
    fn time_range(&self) -> String {
        format!(
            "{} - {} ({} minutes)",
            self.start_time, self.end_time, self.duration_minutes
        )
    }

    fn amount(&self) -> String {
        format!("₹{:.2}", self.total_price)
    }

    fn amenities_line(&self) -> String {
        if self.amenities.is_empty() {
            "None listed".to_string()
        } else {
            self.amenities.join(", ")
        }
    }
}

/// Escape text for inclusion in HTML bodies.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn wrap_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; margin: 0; padding: 20px; color: #333; }}
    .container {{ background-color: #f9f9f9; padding: 20px; border-radius: 5px; }}
    .header {{ color: #2c3e50; font-size: 24px; margin-bottom: 20px; }}
    .details p {{ margin: 5px 0; line-height: 1.6; }}
    .footer {{ margin-top: 20px; font-size: 12px; color: #777; }}
  </style>
</head>
<body>
  <div class="container">
    <h1 class="header">{title}</h1>
{body}
    <div class="footer">
      <p>Thank you for choosing TurfBook!</p>
      <p>If you have any questions, please contact our support.</p>
    </div>
  </div>
</body>
</html>
"#
    )
}

pub fn welcome(to: &str, name: &str) -> EmailMessage {
    let text = format!(
        "Dear {name},\n\nWelcome to TurfBook! Your account is ready.\n\
         Browse turfs near you and book your next game in a few taps.\n"
    );
    let body = format!(
        "    <div class=\"details\">\n      <p>Dear {},</p>\n      <p>Welcome to TurfBook! Your account is ready.</p>\n      <p>Browse turfs near you and book your next game in a few taps.</p>\n    </div>",
        escape_html(name)
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Welcome to TurfBook".to_string(),
        text,
        html: Some(wrap_html("Welcome to TurfBook", &body)),
    }
}

pub fn booking_confirmation_email(to: &str, details: &BookingConfirmation) -> EmailMessage {
    let text = format!(
        "Dear {name},\n\nYour booking for {turf} is confirmed!\n\n\
         Details:\n\
         Booking ID: {reference}\n\
         Location: {location}\n\
         Date: {date}\n\
         Time: {time}\n\
         Total Price: {amount}\n\
         Amenities: {amenities}\n\n\
         Thank you for booking with us!\n",
        name = details.user_name,
        turf = details.turf_name,
        reference = details.reference,
        location = details.location,
        date = details.date,
        time = details.time_range(),
        amount = details.amount(),
        amenities = details.amenities_line(),
    );
    let body = format!(
        "    <div class=\"details\">\n\
      <p>Dear {name},</p>\n\
      <p>Your booking for <strong>{turf}</strong> is confirmed!</p>\n\
      <p><strong>Details:</strong></p>\n\
      <p>Booking ID: {reference}</p>\n\
      <p>Location: {location}</p>\n\
      <p>Date: {date}</p>\n\
      <p>Time: {time}</p>\n\
      <p>Total Price: {amount}</p>\n\
      <p>Amenities: {amenities}</p>\n\
    </div>",
        name = escape_html(&details.user_name),
        turf = escape_html(&details.turf_name),
        reference = escape_html(&details.reference),
        location = escape_html(&details.location),
        date = escape_html(&details.date),
        time = escape_html(&details.time_range()),
        amount = details.amount(),
        amenities = escape_html(&details.amenities_line()),
    );
    EmailMessage {
        to: to.to_string(),
        subject: format!("Booking Confirmation - {}", details.turf_name),
        text,
        html: Some(wrap_html("Booking Confirmation", &body)),
    }
}

pub fn booking_confirmation_whatsapp(to: &str, details: &BookingConfirmation) -> WhatsAppMessage {
    let body = format!(
        "Booking confirmed! {reference}\n\
         Turf: {turf}\n\
         Location: {location}\n\
         Date: {date}\n\
         Time: {time}\n\
         Amount: {amount}\n\
         Amenities: {amenities}",
        reference = details.reference,
        turf = details.turf_name,
        location = details.location,
        date = details.date,
        time = details.time_range(),
        amount = details.amount(),
        amenities = details.amenities_line(),
    );
    WhatsAppMessage {
        to: to.to_string(),
        body,
    }
}

/// Reset link valid for one hour.
pub fn password_reset_request(to: &str, name: &str, frontend_url: &str, token: &str) -> EmailMessage {
    let link = format!("{}/reset-password/{}", frontend_url.trim_end_matches('/'), token);
    let text = format!(
        "Dear {name},\n\nWe received a request to reset your password.\n\
         Use the link below to choose a new one. It expires in 1 hour.\n\n{link}\n\n\
         If you did not request this, you can ignore this email.\n"
    );
    let body = format!(
        "    <div class=\"details\">\n      <p>Dear {name},</p>\n      <p>We received a request to reset your password.</p>\n      <p><a href=\"{link}\">Reset your password</a> (expires in 1 hour)</p>\n      <p>If you did not request this, you can ignore this email.</p>\n    </div>",
        name = escape_html(name),
        link = escape_html(&link),
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Password Reset Request".to_string(),
        text,
        html: Some(wrap_html("Password Reset Request", &body)),
    }
}

pub fn password_reset_confirmation(to: &str, name: &str) -> EmailMessage {
    let text = format!(
        "Dear {name},\n\nYour password has been changed successfully.\n\
         If you did not make this change, contact support immediately.\n"
    );
    let body = format!(
        "    <div class=\"details\">\n      <p>Dear {},</p>\n      <p>Your password has been changed successfully.</p>\n      <p>If you did not make this change, contact support immediately.</p>\n    </div>",
        escape_html(name)
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Password Changed".to_string(),
        text,
        html: Some(wrap_html("Password Changed", &body)),
    }
}
