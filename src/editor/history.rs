//! スナップショット方式の編集履歴
//!
//! 編集のたびに文書全体（テキスト＋カーソル）を丸ごと保存する。
//! 差分方式より単純な代わりに、長い文書で細かい編集を続けるとメモリを食う。
//!
//! ホストの変更通知は変更「後」に届くため、直前に観測した状態を
//! ベースラインとして持ち、変更通知のたびにそれを undo スタックへ積む。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::buffer::{ChangeEvent, ChangeListener, DocumentHost};

/// undo スタックの既定容量
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// 履歴エントリ（不変スナップショット）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryEntry {
    pub text: String,
    pub cursor_offset: usize,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>, cursor_offset: usize) -> Self {
        Self {
            text: text.into(),
            cursor_offset,
        }
    }

    /// ホストの現在状態を写し取る
    pub fn capture<H: DocumentHost + ?Sized>(host: &H) -> Self {
        Self::new(host.text(), host.cursor_offset())
    }
}

/// 容量制限付きの履歴スタック
///
/// 満杯時は最も古いエントリを捨ててから積む。
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_LIMIT)),
            capacity,
        }
    }

    /// 積む。溢れた最古のエントリを返す
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[derive(Debug)]
struct HistoryState {
    undo: HistoryStack,
    redo: HistoryStack,
    /// 最後に観測した文書状態（次の変更の直前状態）。未観測なら `None`
    baseline: Option<HistoryEntry>,
    /// undo/redo の復元中
    restoring: bool,
}

impl HistoryState {
    fn new(capacity: usize) -> Self {
        Self {
            undo: HistoryStack::new(capacity),
            redo: HistoryStack::new(capacity),
            baseline: None,
            restoring: false,
        }
    }

    fn record_change(&mut self, current: HistoryEntry) -> bool {
        if self.restoring {
            return false;
        }
        let Some(before) = self.baseline.replace(current) else {
            // 直前状態が分からないので履歴はここから始める
            log::debug!("history started without a recorded initial state");
            return false;
        };
        if self.undo.push(before).is_some() {
            log::debug!(
                "undo history full ({} entries), dropped the oldest snapshot",
                self.undo.capacity()
            );
        }
        true
    }

    fn note_cursor(&mut self, offset: usize) {
        if self.restoring {
            return;
        }
        if let Some(baseline) = self.baseline.as_mut() {
            baseline.cursor_offset = offset;
        }
    }
}

/// 履歴記録器
///
/// ホストに変更リスナーとして登録され、履歴マネージャと状態を共有する。
#[derive(Clone)]
pub struct HistoryRecorder {
    inner: Rc<RefCell<HistoryState>>,
}

impl ChangeListener for HistoryRecorder {
    fn on_change(&mut self, event: &ChangeEvent<'_>) {
        let mut state = self.inner.borrow_mut();
        match *event {
            ChangeEvent::ContentChanged { text, cursor } => {
                // 通常の編集は必ず redo を無効にする
                if state.record_change(HistoryEntry::new(text, cursor)) {
                    state.redo.clear();
                }
            }
            ChangeEvent::CursorMoved { new_offset, .. } => state.note_cursor(new_offset),
        }
    }
}

/// 復元中フラグを立て、スコープを抜けると下ろす
struct RestoreGuard {
    inner: Rc<RefCell<HistoryState>>,
}

impl RestoreGuard {
    fn enter(inner: &Rc<RefCell<HistoryState>>) -> Self {
        inner.borrow_mut().restoring = true;
        Self {
            inner: Rc::clone(inner),
        }
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        self.inner.borrow_mut().restoring = false;
    }
}

/// 履歴管理マネージャ
pub struct HistoryManager {
    inner: Rc<RefCell<HistoryState>>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// undo スタックの容量を指定して作成
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HistoryState::new(limit))),
        }
    }

    /// ホストの現在状態を初期状態として作成（記録器は登録しない）
    ///
    /// `record_change` / `note_cursor` を直接呼ぶホスト向け。
    pub fn for_host<H: DocumentHost + ?Sized>(host: &H) -> Self {
        let manager = Self::new();
        manager.inner.borrow_mut().baseline = Some(HistoryEntry::capture(host));
        manager
    }

    /// ホストに記録器を登録し、現在状態をベースラインにする
    pub fn bind<H: DocumentHost + ?Sized>(&self, host: &mut H) {
        self.inner.borrow_mut().baseline = Some(HistoryEntry::capture(&*host));
        host.add_change_listener(Box::new(self.recorder()));
    }

    /// 変更リスナーとして登録できる記録器
    pub fn recorder(&self) -> HistoryRecorder {
        HistoryRecorder {
            inner: Rc::clone(&self.inner),
        }
    }

    /// 変更直前のスナップショットを undo スタックへ積む
    ///
    /// `current` は変更後の状態で、次回の直前状態になる。
    /// 復元中、または初期状態が未記録（`for_host` / `bind` / `clear` を
    /// 経ていない）ときは積まずに `false` を返す。redo は消さないので、
    /// 通常の編集では続けて `clear_redo` を呼ぶこと。
    pub fn record_change(&self, current: HistoryEntry) -> bool {
        self.inner.borrow_mut().record_change(current)
    }

    /// カーソル移動をベースラインに反映
    pub fn note_cursor(&self, offset: usize) {
        self.inner.borrow_mut().note_cursor(offset);
    }

    /// redo スタックを破棄
    pub fn clear_redo(&self) {
        self.inner.borrow_mut().redo.clear();
    }

    /// 両スタックを破棄し、ホストの現在状態をベースラインにする
    pub fn clear<H: DocumentHost + ?Sized>(&self, host: &H) {
        let mut state = self.inner.borrow_mut();
        state.undo.clear();
        state.redo.clear();
        state.baseline = Some(HistoryEntry::capture(host));
    }

    /// 直前の状態に戻す。戻す履歴がなければ `false`
    pub fn undo<H: DocumentHost + ?Sized>(&self, host: &mut H) -> bool {
        self.restore(host, Direction::Undo)
    }

    /// undo を取り消す。やり直す履歴がなければ `false`
    pub fn redo<H: DocumentHost + ?Sized>(&self, host: &mut H) -> bool {
        self.restore(host, Direction::Redo)
    }

    pub fn can_undo(&self) -> bool {
        !self.inner.borrow().undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.inner.borrow().redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.inner.borrow().undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.inner.borrow().redo.len()
    }

    pub fn limit(&self) -> usize {
        self.inner.borrow().undo.capacity()
    }

    pub fn is_restoring(&self) -> bool {
        self.inner.borrow().restoring
    }

    fn restore<H: DocumentHost + ?Sized>(&self, host: &mut H, direction: Direction) -> bool {
        if self.inner.borrow().restoring {
            return false;
        }

        let guard = RestoreGuard::enter(&self.inner);

        let entry = {
            let mut state = self.inner.borrow_mut();
            let state = &mut *state;
            let (from, to) = match direction {
                Direction::Undo => (&mut state.undo, &mut state.redo),
                Direction::Redo => (&mut state.redo, &mut state.undo),
            };
            let Some(entry) = from.pop() else {
                return false;
            };
            to.push(HistoryEntry::capture(&*host));
            entry
        };

        // ホストからの変更通知はガードにより無視される
        host.set_text(&entry.text);
        host.set_cursor_offset(entry.cursor_offset);
        host.scroll_to_offset(entry.cursor_offset);

        log::debug!(
            "{:?} restored {} chars, cursor {}",
            direction,
            entry.text.chars().count(),
            entry.cursor_offset
        );

        self.inner.borrow_mut().baseline = Some(HistoryEntry::capture(&*host));
        drop(guard);
        true
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("HistoryManager")
            .field("undo", &state.undo.len())
            .field("redo", &state.redo.len())
            .field("restoring", &state.restoring)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}
