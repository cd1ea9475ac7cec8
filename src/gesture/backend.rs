use crate::gesture::tap::{HookBackend, PointerEvent, TapHandler};
use anyhow::anyhow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[cfg(windows)]
struct HookThread {
    thread_id: u32,
    join: std::thread::JoinHandle<()>,
}

/// `WH_MOUSE_LL` hook running on its own message-pumping thread.
#[cfg(windows)]
#[derive(Default)]
pub struct DefaultHookBackend {
    hook_thread: Option<HookThread>,
}

#[cfg(windows)]
thread_local! {
    // Only ever set on the hook thread; the callback runs on that same thread.
    static TAP_HANDLER: std::cell::RefCell<Option<Arc<TapHandler>>> =
        const { std::cell::RefCell::new(None) };
}

#[cfg(windows)]
impl HookBackend for DefaultHookBackend {
    fn install(&mut self, handler: Arc<TapHandler>) -> anyhow::Result<()> {
        if self.hook_thread.is_some() {
            return Ok(());
        }

        use windows::Win32::System::LibraryLoader::GetModuleHandleW;
        use windows::Win32::System::Threading::GetCurrentThreadId;
        use windows::Win32::UI::WindowsAndMessaging::{
            DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
            UnhookWindowsHookEx, MSG, PM_NOREMOVE, WH_MOUSE_LL,
        };

        // Every path on the hook thread sends exactly once before returning, so
        // install() blocks until the hook is live or has failed.
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<anyhow::Result<u32>>(1);

        let join = std::thread::Builder::new()
            .name("pointer-tap".into())
            .spawn(move || {
                let mut msg = MSG::default();
                unsafe {
                    let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                }

                let thread_id = unsafe { GetCurrentThreadId() };

                let hmodule = match unsafe { GetModuleHandleW(None) } {
                    Ok(h) => h,
                    Err(e) => {
                        let _ = ready_tx.send(Err(anyhow!(e)));
                        return;
                    }
                };

                TAP_HANDLER.with(|slot| *slot.borrow_mut() = Some(handler));

                let hook = match unsafe {
                    SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), hmodule, 0)
                } {
                    Ok(h) if !h.0.is_null() => h,
                    Ok(_) => {
                        TAP_HANDLER.with(|slot| slot.borrow_mut().take());
                        let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                        return;
                    }
                    Err(e) => {
                        TAP_HANDLER.with(|slot| slot.borrow_mut().take());
                        let _ = ready_tx.send(Err(anyhow!(e)));
                        return;
                    }
                };

                let _ = ready_tx.send(Ok(thread_id));

                loop {
                    let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                    // 0 is WM_QUIT, -1 is an error.
                    if r.0 == 0 || r.0 == -1 {
                        break;
                    }
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }

                unsafe {
                    let _ = UnhookWindowsHookEx(hook);
                }
                TAP_HANDLER.with(|slot| slot.borrow_mut().take());
            })?;

        let thread_id = match ready_rx.recv() {
            Ok(result) => result?,
            Err(_) => {
                let _ = join.join();
                return Err(anyhow!("pointer tap thread exited before signalling"));
            }
        };

        self.hook_thread = Some(HookThread { thread_id, join });
        Ok(())
    }

    fn uninstall(&mut self) -> anyhow::Result<()> {
        use windows::Win32::Foundation::{LPARAM, WPARAM};
        use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};

        if let Some(thread_id) = self.hook_thread.as_ref().map(|th| th.thread_id) {
            // The thread stays registered until WM_QUIT is queued.
            unsafe {
                PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0))?;
            }
        }
        if let Some(th) = self.hook_thread.take() {
            th.join
                .join()
                .map_err(|_| anyhow!("pointer tap thread panicked"))?;
        }
        Ok(())
    }

    fn is_installed(&self) -> bool {
        self.hook_thread.is_some()
    }
}

#[cfg(windows)]
fn pointer_input(message: u32) -> crate::gesture::tap::PointerInput {
    use crate::gesture::tap::{MouseButton, PointerInput};
    use windows::Win32::UI::WindowsAndMessaging::{
        WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEHWHEEL,
        WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_RBUTTONDOWN, WM_RBUTTONUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
    };

    match message {
        WM_LBUTTONDOWN => PointerInput::ButtonDown(MouseButton::Left),
        WM_LBUTTONUP => PointerInput::ButtonUp(MouseButton::Left),
        WM_RBUTTONDOWN => PointerInput::ButtonDown(MouseButton::Right),
        WM_RBUTTONUP => PointerInput::ButtonUp(MouseButton::Right),
        WM_MBUTTONDOWN => PointerInput::ButtonDown(MouseButton::Middle),
        WM_MBUTTONUP => PointerInput::ButtonUp(MouseButton::Middle),
        WM_XBUTTONDOWN => PointerInput::ButtonDown(MouseButton::X),
        WM_XBUTTONUP => PointerInput::ButtonUp(MouseButton::X),
        WM_MOUSEMOVE => PointerInput::Move,
        WM_MOUSEWHEEL | WM_MOUSEHWHEEL => PointerInput::Wheel,
        _ => PointerInput::Other,
    }
}

#[cfg(windows)]
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: windows::Win32::Foundation::WPARAM,
    l_param: windows::Win32::Foundation::LPARAM,
) -> windows::Win32::Foundation::LRESULT {
    use windows::Win32::UI::WindowsAndMessaging::{CallNextHookEx, HHOOK};

    let forward = || unsafe { CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param) };

    let handler = TAP_HANDLER
        .try_with(|slot| slot.try_borrow().ok().and_then(|h| h.clone()))
        .ok()
        .flatten();

    match handler {
        Some(handler) => {
            let event = PointerEvent::new(
                n_code,
                pointer_input(w_param.0 as u32),
                std::time::Instant::now(),
            );
            handler.handle(&event, forward)
        }
        None => forward(),
    }
}

#[cfg(not(windows))]
#[derive(Default)]
pub struct DefaultHookBackend;

#[cfg(not(windows))]
impl HookBackend for DefaultHookBackend {
    fn install(&mut self, _handler: Arc<TapHandler>) -> anyhow::Result<()> {
        Err(anyhow!("global pointer hooks are not supported on this platform"))
    }

    fn uninstall(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_installed(&self) -> bool {
        false
    }
}

/// In-process stand-in for the OS hook, driven through [`MockHookHandle`].
#[derive(Clone)]
pub struct MockHookBackend {
    state: Arc<MockHookState>,
}

#[derive(Default)]
struct MockHookState {
    fail_install: AtomicBool,
    fail_uninstall: AtomicBool,
    install_count: AtomicUsize,
    uninstall_count: AtomicUsize,
    forwarded: AtomicUsize,
    handler: Mutex<Option<Arc<TapHandler>>>,
}

impl MockHookBackend {
    pub fn new() -> (Self, MockHookHandle) {
        let state = Arc::new(MockHookState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockHookHandle { state },
        )
    }

    /// A backend whose `install` always fails, as when the OS refuses the hook.
    pub fn failing() -> (Self, MockHookHandle) {
        let (backend, handle) = Self::new();
        backend.state.fail_install.store(true, Ordering::SeqCst);
        (backend, handle)
    }
}

impl HookBackend for MockHookBackend {
    fn install(&mut self, handler: Arc<TapHandler>) -> anyhow::Result<()> {
        if self.state.fail_install.load(Ordering::SeqCst) {
            return Err(anyhow!("hook registration refused"));
        }
        let mut guard = self.state.handler.lock().map_err(|_| anyhow!("lock"))?;
        if guard.is_none() {
            self.state.install_count.fetch_add(1, Ordering::SeqCst);
            *guard = Some(handler);
        }
        Ok(())
    }

    fn uninstall(&mut self) -> anyhow::Result<()> {
        if self.state.fail_uninstall.load(Ordering::SeqCst) {
            return Err(anyhow!("quit message could not be posted"));
        }
        let mut guard = self.state.handler.lock().map_err(|_| anyhow!("lock"))?;
        if guard.take().is_some() {
            self.state.uninstall_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_installed(&self) -> bool {
        match self.state.handler.lock() {
            Ok(guard) => guard.is_some(),
            Err(_) => false,
        }
    }
}

pub struct MockHookHandle {
    state: Arc<MockHookState>,
}

impl MockHookHandle {
    pub fn install_count(&self) -> usize {
        self.state.install_count.load(Ordering::SeqCst)
    }

    pub fn uninstall_count(&self) -> usize {
        self.state.uninstall_count.load(Ordering::SeqCst)
    }

    /// Make subsequent `uninstall` calls fail, leaving the hook in place.
    pub fn set_fail_uninstall(&self, fail: bool) {
        self.state.fail_uninstall.store(fail, Ordering::SeqCst);
    }

    /// Events passed on to the next hook in the chain.
    pub fn forwarded_count(&self) -> usize {
        self.state.forwarded.load(Ordering::SeqCst)
    }

    /// Deliver `event` as the OS would. Returns false when no hook is installed.
    pub fn emit(&self, event: PointerEvent) -> bool {
        let handler = match self.state.handler.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        };
        match handler {
            Some(handler) => {
                handler.handle(&event, || {
                    self.state.forwarded.fetch_add(1, Ordering::SeqCst);
                });
                true
            }
            None => false,
        }
    }
}
