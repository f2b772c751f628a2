//! Order notifications over AWS SNS.
//!
//! Each notification kind goes to its own topic. Topics are optional: an
//! unset topic is logged and skipped. Publishing never fails the caller;
//! every method reports success as a `bool`.

mod error;
pub mod messages;

pub use error::NotifyError;

use askama::Template;
use aws_sdk_sns::Client as SnsClient;
use aws_sdk_sns::types::MessageAttributeValue;
use rust_decimal::Decimal;

use local_crust_core::OrderStatus;

use crate::config::SnsTopics;
use crate::models::{Order, OrderItem};

use messages::{
    BakerNewOrder, Delivery, Line, OrderConfirmation, PaymentConfirmation, StatusUpdate,
    format_address, rupees, status_copy,
};

/// Who an order notification is about.
#[derive(Debug, Clone, Copy)]
pub struct Recipient<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

/// SNS publisher.
#[derive(Clone, Debug)]
pub struct Notifier {
    client: Option<SnsClient>,
    topics: SnsTopics,
}

impl Notifier {
    /// Build a publisher, loading AWS credentials only when a topic is set.
    pub async fn from_topics(topics: SnsTopics) -> Self {
        let client = if topics.any() {
            let config = aws_config::load_from_env().await;
            Some(SnsClient::new(&config))
        } else {
            tracing::info!("No SNS topics configured, order notifications disabled");
            None
        };
        Self { client, topics }
    }

    /// A publisher with no topics. Every publish returns `false`.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: None,
            topics: SnsTopics::default(),
        }
    }

    /// Tell the customer their order was placed.
    pub async fn publish_order_confirmation(
        &self,
        order: &Order,
        customer: Recipient<'_>,
        items: &[OrderItem],
    ) -> bool {
        let body = OrderConfirmation {
            order_number: &order.order_number,
            customer_name: customer.name,
            customer_email: customer.email,
            lines: items.iter().map(Line::from).collect(),
            total: rupees(order.total_amount),
        };

        self.publish(
            self.topics.order_confirmation.as_deref(),
            &format!("🎉 Order Confirmed - {}", order.order_number),
            &body,
            &[
                ("notification_type", "order_confirmation"),
                ("order_id", &order.order_number),
            ],
        )
        .await
    }

    /// Tell the customer their order moved to `status`.
    pub async fn publish_order_status_update(
        &self,
        order_number: &str,
        customer: Recipient<'_>,
        status: OrderStatus,
        baker_name: Option<&str>,
    ) -> bool {
        let copy = status_copy(status);
        let body = StatusUpdate {
            order_number,
            customer_name: customer.name,
            customer_email: customer.email,
            baker_name,
            title: copy.title,
            description: copy.description,
            action: copy.action,
        };

        self.publish(
            self.topics.order_status.as_deref(),
            &format!("{} Order {} - {order_number}", copy.emoji, copy.title),
            &body,
            &[
                ("notification_type", "status_update"),
                ("order_id", order_number),
                ("status", status.as_str()),
            ],
        )
        .await
    }

    /// Tell the customer their order is on its way.
    pub async fn publish_delivery_notification(
        &self,
        order: &Order,
        customer: Recipient<'_>,
        estimated_time: Option<&str>,
    ) -> bool {
        let body = Delivery {
            order_number: &order.order_number,
            customer_name: customer.name,
            customer_email: customer.email,
            address: format_address(&order.delivery_address),
            estimated_time,
        };

        self.publish(
            self.topics.delivery.as_deref(),
            &format!("🚚 Your Order is On The Way - {}", order.order_number),
            &body,
            &[
                ("notification_type", "delivery_notification"),
                ("order_id", &order.order_number),
            ],
        )
        .await
    }

    /// Tell a baker about the lines they need to prepare.
    pub async fn publish_baker_new_order(
        &self,
        order_number: &str,
        baker_name: &str,
        customer_name: &str,
        items: &[&OrderItem],
        subtotal: Decimal,
    ) -> bool {
        let body = BakerNewOrder {
            order_number,
            baker_name,
            customer_name,
            lines: items.iter().map(|item| Line::from(*item)).collect(),
            total: rupees(subtotal),
        };

        self.publish(
            self.topics.baker_order.as_deref(),
            &format!("🔔 New Order Received - {order_number}"),
            &body,
            &[
                ("notification_type", "baker_new_order"),
                ("order_id", order_number),
            ],
        )
        .await
    }

    /// Confirm a completed payment to the customer.
    pub async fn publish_payment_confirmation(
        &self,
        order: &Order,
        customer: Recipient<'_>,
        payment_id: &str,
    ) -> bool {
        let body = PaymentConfirmation {
            order_number: &order.order_number,
            customer_name: customer.name,
            customer_email: customer.email,
            payment_id,
            amount: rupees(order.total_amount),
        };

        self.publish(
            self.topics.payment.as_deref(),
            &format!("💳 Payment Successful - {}", order.order_number),
            &body,
            &[
                ("notification_type", "payment_confirmation"),
                ("order_id", &order.order_number),
                ("payment_id", payment_id),
            ],
        )
        .await
    }

    /// Subscribe an address to the customer-facing topics.
    ///
    /// Returns `true` if at least one subscription was created. SNS sends
    /// the address a confirmation link before delivering anything.
    pub async fn subscribe_email(&self, email: &str) -> bool {
        let Some(client) = &self.client else {
            return false;
        };

        let topics = [
            &self.topics.order_confirmation,
            &self.topics.order_status,
            &self.topics.delivery,
            &self.topics.payment,
        ];

        let mut subscribed = 0_usize;
        for topic_arn in topics.into_iter().flatten() {
            match client
                .subscribe()
                .topic_arn(topic_arn)
                .protocol("email")
                .endpoint(email)
                .send()
                .await
            {
                Ok(_) => subscribed += 1,
                Err(e) => {
                    let e = aws_sdk_sns::Error::from(e);
                    tracing::warn!(topic = %topic_name(topic_arn), error = %e, "SNS subscribe failed");
                }
            }
        }

        tracing::info!(subscribed, "Subscribed email to SNS topics");
        subscribed > 0
    }

    async fn publish(
        &self,
        topic_arn: Option<&str>,
        subject: &str,
        body: &impl Template,
        attributes: &[(&str, &str)],
    ) -> bool {
        let (Some(client), Some(topic_arn)) = (&self.client, topic_arn) else {
            tracing::info!(subject = %subject, "SNS topic not configured, skipping notification");
            return false;
        };

        match self
            .try_publish(client, topic_arn, subject, body, attributes)
            .await
        {
            Ok(message_id) => {
                tracing::info!(
                    topic = %topic_name(topic_arn),
                    subject = %subject,
                    message_id = %message_id,
                    "SNS notification sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(topic = %topic_name(topic_arn), error = %e, "SNS publish failed");
                false
            }
        }
    }

    async fn try_publish(
        &self,
        client: &SnsClient,
        topic_arn: &str,
        subject: &str,
        body: &impl Template,
        attributes: &[(&str, &str)],
    ) -> Result<String, NotifyError> {
        let message = body.render()?;

        let mut request = client
            .publish()
            .topic_arn(topic_arn)
            .subject(sns_subject(subject))
            .message(message);

        for (name, value) in attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(*value)
                .build()?;
            request = request.message_attributes(*name, attribute);
        }

        let output = request.send().await.map_err(aws_sdk_sns::Error::from)?;
        Ok(output.message_id().unwrap_or_default().to_string())
    }
}

/// Last segment of a topic ARN, for logs.
fn topic_name(topic_arn: &str) -> &str {
    topic_arn.rsplit(':').next().unwrap_or(topic_arn)
}

/// SNS subjects are limited to 100 characters.
fn sns_subject(subject: &str) -> String {
    subject.chars().take(100).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_name() {
        assert_eq!(
            topic_name("arn:aws:sns:ap-south-1:123456789012:local-crust-orders"),
            "local-crust-orders"
        );
        assert_eq!(topic_name("plain"), "plain");
    }

    #[test]
    fn test_subject_truncated() {
        let long = "🎉".repeat(150);
        assert_eq!(sns_subject(&long).chars().count(), 100);
        assert_eq!(sns_subject("Order Confirmed"), "Order Confirmed");
    }

    #[tokio::test]
    async fn test_disabled_notifier_reports_false() {
        let notifier = Notifier::disabled();
        assert!(!notifier.subscribe_email("asha@example.com").await);
        assert!(
            !notifier
                .publish_order_status_update(
                    "LC1",
                    Recipient {
                        name: "Asha",
                        email: "asha@example.com",
                    },
                    OrderStatus::Ready,
                    None,
                )
                .await
        );
    }
}
