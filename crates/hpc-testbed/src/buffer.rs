// ─── Typ‑State Gerätepuffer ──────────────────────────────────────────
//
// Queued  : angelegt, noch nichts eingereiht
// InFlight: Schreiben oder Kernel läuft, Abschluss über EventGuard
// Ready   : synchronisiert, darf gelesen werden

use bytemuck::Pod;
use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    event::Event,
    memory::{Buffer, CL_MEM_READ_WRITE},
    types::{CL_BLOCKING, CL_NON_BLOCKING},
};
use std::{marker::PhantomData, ptr};

#[cfg(feature = "metrics")]
use crate::metrics::{BYTES_DOWN, BYTES_UP, record};
#[cfg(feature = "metrics")]
use std::{sync::atomic::Ordering, time::Instant};

use crate::{ClError, cl_try};

mod sealed {
    pub trait Sealed {}
}

pub trait State: sealed::Sealed {}

pub struct Queued;
impl sealed::Sealed for Queued {}
impl State for Queued {}

pub struct InFlight;
impl sealed::Sealed for InFlight {}
impl State for InFlight {}

pub struct Ready;
impl sealed::Sealed for Ready {}
impl State for Ready {}

/// Typisierter OpenCL-Puffer mit `len` Elementen vom Typ `T`.
pub struct DeviceVec<T: Pod, S: State> {
    buf: Buffer<T>,
    len: usize,
    _state: PhantomData<S>,
}

impl<T: Pod, S: State> std::fmt::Debug for DeviceVec<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceVec")
            .field("len", &self.len)
            .field("elem", &std::any::type_name::<T>())
            .field("state", &std::any::type_name::<S>())
            .finish()
    }
}

// ── Queued ───────────────────────────────────────────────────────────
impl<T: Pod> DeviceVec<T, Queued> {
    /// legt einen neuen Puffer an, noch **nicht** befüllt
    pub fn new(ctx: &Context, len: usize) -> Result<Self, ClError> {
        if len == 0 {
            return Err(ClError::InvalidSize(len));
        }
        let buf = cl_try!(
            unsafe { Buffer::<T>::create(ctx, CL_MEM_READ_WRITE, len, ptr::null_mut()) },
            "clCreateBuffer"
        );
        Ok(Self { buf, len, _state: PhantomData })
    }

    /// Anlegen + Hochladen + Warten in einem Schritt
    pub fn from_slice(
        ctx: &Context,
        queue: &CommandQueue,
        data: &[T],
    ) -> Result<DeviceVec<T, Ready>, ClError> {
        let buf = Self::new(ctx, data.len())?;
        let (in_flight, guard) = buf.enqueue_write(queue, data)?;
        in_flight.into_ready(guard)
    }

    /// Host → Gerät, nicht blockierend. `host` bleibt geliehen, bis der Guard fertig ist.
    ///
    /// Nur crate-intern: ein per `mem::forget` verlorener Guard würde `host`
    /// freigeben, während der Treiber noch liest. Aufrufer warten sofort.
    pub(crate) fn enqueue_write<'h>(
        mut self,
        queue: &CommandQueue,
        host: &'h [T],
    ) -> Result<(DeviceVec<T, InFlight>, EventGuard<'h>), ClError> {
        if host.len() != self.len {
            return Err(ClError::InvalidSize(host.len()));
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();

        let evt = cl_try!(
            unsafe { queue.enqueue_write_buffer(&mut self.buf, CL_NON_BLOCKING, 0, host, &[]) },
            "clEnqueueWriteBuffer"
        );

        #[cfg(feature = "metrics")]
        {
            record("enqueue_write", t);
            BYTES_UP.fetch_add(std::mem::size_of_val(host), Ordering::Relaxed);
        }

        Ok((self.transition(), EventGuard::new(evt)))
    }

    /// Ausgabepuffer an einen Kernel übergeben
    pub fn launch(self) -> DeviceVec<T, InFlight> {
        self.transition()
    }
}

// ── InFlight ─────────────────────────────────────────────────────────
impl<T: Pod> DeviceVec<T, InFlight> {
    /// wartet auf das Event und überführt in Ready
    pub fn into_ready(self, guard: EventGuard<'_>) -> Result<DeviceVec<T, Ready>, ClError> {
        guard.wait()?;
        Ok(self.transition())
    }
}

// ── Ready → Host ─────────────────────────────────────────────────────
impl<T: Pod> DeviceVec<T, Ready> {
    /// Gerät → Host, blockierend
    pub fn read(&self, queue: &CommandQueue) -> Result<Vec<T>, ClError> {
        let mut out = vec![T::zeroed(); self.len];

        #[cfg(feature = "metrics")]
        let t = Instant::now();

        cl_try!(
            unsafe { queue.enqueue_read_buffer(&self.buf, CL_BLOCKING, 0, &mut out, &[]) },
            "clEnqueueReadBuffer"
        );

        #[cfg(feature = "metrics")]
        {
            record("enqueue_read", t);
            BYTES_DOWN.fetch_add(std::mem::size_of_val(out.as_slice()), Ordering::Relaxed);
        }

        Ok(out)
    }
}

// ── Accessors (alle States) ──────────────────────────────────────────
impl<T: Pod, S: State> DeviceVec<T, S> {
    pub fn raw(&self) -> &Buffer<T> {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn transition<N: State>(self) -> DeviceVec<T, N> {
        DeviceVec { buf: self.buf, len: self.len, _state: PhantomData }
    }
}

// ── Guard (wartet bei Drop auf Event) ────────────────────────────────
pub struct EventGuard<'h> {
    evt: Option<Event>,
    _host: PhantomData<&'h ()>,
}

impl<'h> EventGuard<'h> {
    pub(crate) fn new(evt: Event) -> Self {
        Self { evt: Some(evt), _host: PhantomData }
    }

    /// explizites Warten mit Fehlerrückgabe
    pub fn wait(mut self) -> Result<(), ClError> {
        match self.evt.take() {
            Some(evt) => {
                cl_try!(evt.wait(), "clWaitForEvents");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for EventGuard<'_> {
    fn drop(&mut self) {
        if let Some(evt) = self.evt.take() {
            if let Err(e) = evt.wait() {
                tracing::warn!("event wait on drop failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClEnv, ClSelection};

    #[test]
    fn empty_buffer_is_rejected() {
        let Ok(env) = ClEnv::init(&ClSelection::default()) else {
            return; // kein OpenCL-Gerät
        };
        let err = DeviceVec::<i32, Queued>::new(&env.context, 0).unwrap_err();
        assert!(matches!(err, ClError::InvalidSize(0)));
    }

    #[test]
    fn from_slice_waits_before_returning() {
        let Ok(env) = ClEnv::init(&ClSelection::default()) else {
            return;
        };
        let ready = {
            let host: Vec<u32> = (0..64).collect();
            DeviceVec::<u32, Queued>::from_slice(&env.context, &env.queue, &host).unwrap()
        };
        // Host-Daten sind hier schon freigegeben, der Puffer muss vollständig sein
        let back = ready.read(&env.queue).unwrap();
        assert_eq!(back, (0..64).collect::<Vec<u32>>());
        assert_eq!(ready.len(), 64);
    }
}
