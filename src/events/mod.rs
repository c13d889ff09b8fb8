use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// The domain events emitted by the services. Consumers hang off the mpsc
// channel created in main.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Quotation lifecycle
    QuotationCreated(Uuid),
    QuotationSent(Uuid),
    QuotationAccepted {
        quotation_id: Uuid,
        order_id: Option<Uuid>,
        invoice_id: Option<Uuid>,
    },
    QuotationRejected {
        quotation_id: Uuid,
        reason: Option<String>,
    },
    QuotationDeleted(Uuid),

    // Order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderCancelled(Uuid),

    // Dealer order events
    DealerOrderCreated(Uuid),
    DealerOrderStatusChanged {
        dealer_order_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Invoice events
    InvoiceIssued {
        invoice_id: Uuid,
        invoice_number: String,
    },
    InvoiceStatusChanged {
        invoice_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Installment events
    InstallmentPlanCreated {
        plan_id: Uuid,
        invoice_id: Uuid,
        term_months: i32,
    },
    InstallmentPaid {
        schedule_id: Uuid,
        plan_id: Uuid,
        installment_number: i32,
    },

    // Payment events
    PaymentRecorded(Uuid),
    PaymentFailed(Uuid),

    // Appointment events
    AppointmentBooked {
        appointment_id: Uuid,
        customer_id: Uuid,
    },
    AppointmentStatusChanged {
        appointment_id: Uuid,
        new_status: String,
    },

    // Feedback
    FeedbackSubmitted {
        feedback_id: Uuid,
        customer_id: Uuid,
        rating: i32,
    },
}

/// Drains the event channel, logging each event. Webhook fan-out or an
/// outbox table would hang off this loop.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::QuotationAccepted {
                quotation_id,
                order_id,
                invoice_id,
            } => {
                info!(
                    %quotation_id,
                    ?order_id,
                    ?invoice_id,
                    "quotation accepted"
                );
            }
            Event::PaymentFailed(payment_id) => {
                warn!(%payment_id, "payment failed");
            }
            other => {
                info!(event = ?other, "event processed");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_events() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send(Event::QuotationSent(id)).await.unwrap();
        match rx.recv().await {
            Some(Event::QuotationSent(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::OrderCreated(Uuid::new_v4())).await.is_err());
    }
}
