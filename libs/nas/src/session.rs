//! NAS request sequencing and reply handling

use crate::error::{NasError, NasResult};
use crate::hooks::{AttachObserver, FrameTap};
use crate::state::{NasState, TransactionCounter};
use crate::sys_info::{self, ServingSystem, SysInfoReport};
use crate::transport::Transport;
use qmi_codec::{dump, Frame, MessageBuilder};
use qmi_types::nas::tlv;
use qmi_types::{
    NasMessage, QmiResult, RadioTechnology, ServiceTechnology, ServiceType,
    BROADCAST_CLIENT_ID, DEFAULT_MAX_MESSAGE_SIZE,
};
use tracing::{debug, info, warn};

/// Encoding parameters fixed for the life of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NasOptions {
    /// Mode-preference bitmask sent with Set System Selection Preference
    pub mode_preference: u16,
    /// Capacity of the encode buffer
    pub max_message_size: usize,
}

impl Default for NasOptions {
    fn default() -> Self {
        Self {
            mode_preference: RadioTechnology::Gsm.mode_bit(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// A request handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub message: NasMessage,
    pub transaction_id: u16,
    pub frame: Vec<u8>,
}

/// How a reply affected the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// State moved forward (and the next request went out)
    Advanced,
    /// The modem refused the request; state is unchanged
    Rejected(String),
    /// System Info evaluated; service tracking is up to date
    Processed,
    /// Logged only
    Ignored,
}

/// NAS client session for one device
pub struct NasSession<T, O> {
    state: NasState,
    transactions: TransactionCounter,
    client_id: u8,
    current_service: ServiceTechnology,
    options: NasOptions,
    transport: T,
    observer: O,
    tap: Option<Box<dyn FrameTap + Send>>,
}

impl<T: Transport, O: AttachObserver> NasSession<T, O> {
    pub fn new(client_id: u8, transport: T, observer: O) -> Self {
        Self {
            state: NasState::default(),
            transactions: TransactionCounter::new(),
            client_id,
            current_service: ServiceTechnology::None,
            options: NasOptions::default(),
            transport,
            observer,
            tap: None,
        }
    }

    pub fn with_options(mut self, options: NasOptions) -> Self {
        self.options = options;
        self
    }

    /// Route every sent and received frame through `tap`
    pub fn with_tap(mut self, tap: impl FrameTap + Send + 'static) -> Self {
        self.tap = Some(Box::new(tap));
        self
    }

    pub fn state(&self) -> NasState {
        self.state
    }

    pub fn client_id(&self) -> u8 {
        self.client_id
    }

    pub fn current_service(&self) -> ServiceTechnology {
        self.current_service
    }

    pub fn options(&self) -> &NasOptions {
        &self.options
    }

    /// Transaction id of the last request, zero before the first
    pub fn last_transaction_id(&self) -> u8 {
        self.transactions.current()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_parts(self) -> (T, O) {
        (self.transport, self.observer)
    }

    /// Encode and write the request for the current state.
    ///
    /// Every call consumes a fresh transaction id, so calling again in the
    /// same state is a retry. Writing the system selection request moves the
    /// session to `IndicationRegister`.
    pub fn send(&mut self) -> NasResult<OutboundMessage> {
        let transaction_id = self.transactions.advance();

        let outbound = match self.state {
            NasState::GotClientId | NasState::SetSystemSelection => {
                let mode = self.options.mode_preference.to_le_bytes();
                self.build(
                    NasMessage::SetSystemSelectionPreference,
                    transaction_id,
                    &[(tlv::MODE_PREFERENCE, &mode[..])],
                )?
            }
            NasState::IndicationRegister => self.build(
                NasMessage::IndicationRegister,
                transaction_id,
                &[(tlv::SYS_INFO_INDICATION, &[0x01][..])],
            )?,
            NasState::SystemInfoQuery => {
                self.build(NasMessage::GetSysInfo, transaction_id, &[])?
            }
        };

        if let Some(tap) = &self.tap {
            tap.sent(&outbound.frame);
        }
        let written = self.transport.write_frame(&outbound.frame)?;
        debug!(
            request = outbound.message.name(),
            transaction_id, written, "NAS request sent"
        );

        if matches!(
            self.state,
            NasState::GotClientId | NasState::SetSystemSelection
        ) {
            self.state = NasState::IndicationRegister;
        }

        Ok(outbound)
    }

    fn build(
        &self,
        message: NasMessage,
        transaction_id: u16,
        tlvs: &[(u8, &[u8])],
    ) -> NasResult<OutboundMessage> {
        let mut builder = MessageBuilder::new(
            self.options.max_message_size,
            ServiceType::Nas,
            self.client_id,
            transaction_id,
            message.id(),
        )?;
        for (tlv_type, value) in tlvs {
            builder.push_tlv(*tlv_type, value)?;
        }

        Ok(OutboundMessage {
            message,
            transaction_id,
            frame: builder.build(),
        })
    }

    /// Process one frame read from the device.
    ///
    /// Frames for other services or other clients are ignored. A malformed
    /// frame is an error and leaves the session untouched.
    pub fn handle_reply(&mut self, buffer: &[u8]) -> NasResult<HandleOutcome> {
        if let Some(tap) = &self.tap {
            tap.received(buffer);
        }
        let frame = Frame::parse(buffer)?;
        let header = frame.header;

        if header.service != ServiceType::Nas {
            debug!(service = header.service.name(), "Not a NAS message");
            return Ok(HandleOutcome::Ignored);
        }
        if header.client_id != self.client_id && header.client_id != BROADCAST_CLIENT_ID {
            debug!(client_id = header.client_id, "NAS message for another client");
            return Ok(HandleOutcome::Ignored);
        }

        match NasMessage::try_from(header.message_id) {
            Ok(NasMessage::IndicationRegister) => self.on_indication_register(&frame),
            Ok(NasMessage::GetSysInfo | NasMessage::SysInfoIndication) => {
                self.on_sys_info(&frame)
            }
            Ok(NasMessage::GetServingSystem) => {
                self.on_serving_system(&frame);
                Ok(HandleOutcome::Ignored)
            }
            Ok(NasMessage::SetSystemSelectionPreference) => {
                match frame.first_tlv()? {
                    Some(record) => {
                        let result = sys_info::read_result(&record)?;
                        debug!(?result, "System selection preference acknowledged");
                    }
                    None => debug!("System selection preference reply without result"),
                }
                Ok(HandleOutcome::Ignored)
            }
            Err(_) => {
                warn!("Unrecognized NAS message {:#06x}", header.message_id);
                dump::trace_frame("received", buffer);
                Ok(HandleOutcome::Ignored)
            }
        }
    }

    fn on_indication_register(&mut self, frame: &Frame<'_>) -> NasResult<HandleOutcome> {
        let record = frame.first_tlv()?.ok_or(NasError::MissingResult {
            message_id: frame.header.message_id,
        })?;

        if let QmiResult::Failure { error } = sys_info::read_result(&record)? {
            warn!(error, "Could not register for NAS indications");
            return Ok(HandleOutcome::Rejected(
                "indication registration failed".to_string(),
            ));
        }

        info!("Registered for System Info indications");
        self.state = NasState::SystemInfoQuery;
        if let Err(e) = self.send() {
            warn!(error = %e, "System Info query not sent, waiting for retry");
        }
        Ok(HandleOutcome::Advanced)
    }

    fn on_sys_info(&mut self, frame: &Frame<'_>) -> NasResult<HandleOutcome> {
        match sys_info::evaluate(frame)? {
            SysInfoReport::Failed { error } => {
                debug!(error, "System Info reports failure");
                Ok(HandleOutcome::Ignored)
            }
            SysInfoReport::Observed(observed) => {
                self.apply_observed(observed);
                Ok(HandleOutcome::Processed)
            }
        }
    }

    fn apply_observed(&mut self, observed: ServiceTechnology) {
        let previous = self.current_service;
        if !observed.has_service() {
            debug!("No service");
        }

        match (previous.has_service(), observed.has_service()) {
            (true, true) if previous != observed => {
                info!(from = ?previous, to = ?observed, "Technology has changed");
                self.current_service = observed;
            }
            (false, true) | (true, false) => {
                info!(from = ?previous, to = ?observed, "Attach state changed");
                self.current_service = observed;
                self.observer.attach_changed(observed.has_service());
            }
            _ => {}
        }
    }

    /// Diagnostics only; a bad serving system TLV never fails the reply.
    fn on_serving_system(&self, frame: &Frame<'_>) {
        match ServingSystem::decode(frame) {
            Ok(Some(serving)) => debug!(
                registration = ?serving.registration,
                cs_attached = serving.cs_attached,
                ps_attached = serving.ps_attached,
                selected_network = serving.selected_network,
                radio_interfaces = ?serving.radio_interfaces,
                "Serving system"
            ),
            Ok(None) => debug!("Serving system reply without serving system TLV"),
            Err(e) => debug!(error = %e, "Undecodable serving system TLV"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<u8>>,
    }

    impl Transport for Recorder {
        fn write_frame(&mut self, frame: &[u8]) -> io::Result<usize> {
            self.frames.push(frame.to_vec());
            Ok(frame.len())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn write_frame(&mut self, _frame: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone"))
        }
    }

    #[derive(Default)]
    struct Events(Vec<bool>);

    impl AttachObserver for Events {
        fn attach_changed(&mut self, has_service: bool) {
            self.0.push(has_service);
        }
    }

    #[test]
    fn test_system_selection_bytes() {
        let mut session = NasSession::new(2, Recorder::default(), Events::default());
        let outbound = session.send().unwrap();

        assert_eq!(outbound.message, NasMessage::SetSystemSelectionPreference);
        assert_eq!(outbound.transaction_id, 1);
        assert_eq!(
            outbound.frame,
            vec![
                0x01, 0x11, 0x00, 0x00, 0x03, 0x02, 0x00, 0x01, 0x00, 0x33, 0x00, 0x05, 0x00,
                0x11, 0x02, 0x00, 0x04, 0x00,
            ]
        );
        assert_eq!(session.transport().frames, vec![outbound.frame]);
        assert_eq!(session.state(), NasState::IndicationRegister);
    }

    #[test]
    fn test_mode_preference_option() {
        let options = NasOptions {
            mode_preference: RadioTechnology::mode_mask(&[
                RadioTechnology::Gsm,
                RadioTechnology::Lte,
            ]),
            ..NasOptions::default()
        };
        let mut session =
            NasSession::new(1, Recorder::default(), Events::default()).with_options(options);
        let outbound = session.send().unwrap();

        assert_eq!(&outbound.frame[13..], &[0x11, 0x02, 0x00, 0x14, 0x00]);
    }

    #[test]
    fn test_indication_register_request() {
        let mut session = NasSession::new(1, Recorder::default(), Events::default());
        session.send().unwrap();
        let outbound = session.send().unwrap();

        assert_eq!(outbound.message, NasMessage::IndicationRegister);
        assert_eq!(outbound.transaction_id, 2);
        assert_eq!(&outbound.frame[13..], &[0x18, 0x01, 0x00, 0x01]);
        // retries do not advance past IndicationRegister
        assert_eq!(session.state(), NasState::IndicationRegister);
    }

    #[test]
    fn test_failed_write_keeps_state() {
        let mut session = NasSession::new(1, Broken, Events::default());

        assert!(matches!(session.send(), Err(NasError::Transport(_))));
        assert_eq!(session.state(), NasState::GotClientId);
        assert_eq!(session.last_transaction_id(), 1);
    }

    #[test]
    fn test_buffer_too_small() {
        let options = NasOptions {
            max_message_size: 14,
            ..NasOptions::default()
        };
        let mut session =
            NasSession::new(1, Recorder::default(), Events::default()).with_options(options);

        assert!(matches!(session.send(), Err(NasError::Encode(_))));
        assert!(session.transport().frames.is_empty());
    }

    #[test]
    fn test_apply_observed_transitions() {
        let mut session = NasSession::new(1, Recorder::default(), Events::default());

        session.apply_observed(ServiceTechnology::None);
        session.apply_observed(ServiceTechnology::Gsm);
        session.apply_observed(ServiceTechnology::Gsm);
        session.apply_observed(ServiceTechnology::Lte);
        assert_eq!(session.current_service(), ServiceTechnology::Lte);
        session.apply_observed(ServiceTechnology::None);

        assert_eq!(session.observer().0, vec![true, false]);
        assert_eq!(session.current_service(), ServiceTechnology::None);
    }
}
