//! Exposed channels which can be used to share data across devices & consumers

use embassy_sync::channel::Channel;
pub use embassy_sync::{blocking_mutex, channel};

use crate::event::Event;
use crate::input_device::InputDevice;
use crate::{EVENT_CHANNEL_SIZE, RawMutex};

/// Channel for matrix events
pub static EVENT_CHANNEL: Channel<RawMutex, Event, EVENT_CHANNEL_SIZE> = Channel::new();

/// Read events from `device` forever and send them to `channel`.
pub async fn forward_events<D: InputDevice, const N: usize>(device: &mut D, channel: &Channel<RawMutex, Event, N>) -> ! {
    loop {
        let event = device.read_event().await;
        channel.send(event).await;
    }
}
