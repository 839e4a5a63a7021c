use crate::domain::user::User;
use crate::error::{Result, ShopError};
use std::io::Write;

/// Placeholder rendered when a user has no purchases yet.
const EMPTY_PURCHASES: &str = "none";

/// Writes the user collection as CSV, one row per user.
///
/// Password hashes never appear in the output; the purchase list is
/// flattened to a comma-joined list of product names.
pub struct UserCsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> UserCsvWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(sink),
        }
    }

    pub fn write_users(&mut self, users: &[User]) -> Result<()> {
        self.writer
            .write_record(["id", "phoneNumber", "balance", "invitationCode", "purchases"])
            .map_err(csv_error)?;

        for user in users {
            let purchases = if user.purchases.is_empty() {
                EMPTY_PURCHASES.to_string()
            } else {
                user.purchases
                    .iter()
                    .map(|product| product.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            self.writer
                .write_record([
                    user.id.to_string(),
                    user.phone_number.clone(),
                    user.balance.0.to_string(),
                    user.invitation_code.clone(),
                    purchases,
                ])
                .map_err(csv_error)?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

/// Renders the whole collection into an in-memory CSV document.
pub fn render_users_csv(users: &[User]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    UserCsvWriter::new(&mut buffer).write_users(users)?;
    Ok(buffer)
}

fn csv_error(err: csv::Error) -> ShopError {
    ShopError::Internal(format!("CSV export failed: {err}"))
}
