//! Словарь повторяющихся строк.
//!
//! Однопроходный prescan дерева собирает таблицу наиболее частых строк
//! (ключи карт и строковые значения) и присваивает каждой однобайтовый id.
//! Writer и reader используют таблицу симметрично: повторная строка в теле
//! заменяется одним байтом-ссылкой.
//!
//! Двухпроходная схема (prescan + emit) выбрана вместо адаптивного словаря
//! сознательно: формат остаётся статически самодостаточным, и читателю не
//! нужен неограниченный lookahead.

use std::{
    collections::HashMap,
    io::{Read, Write},
};

use byteorder::{ReadBytesExt, WriteBytesExt};

use super::{
    budget::AllocBudget,
    varint::{read_varint, write_varint},
};
use crate::{
    error::{CodecResult, FormatError},
    tag::{Tag, TagMap},
};

/// Лимит записей словаря: байт count хранит точное число, а ссылки
/// остаются однобайтовыми.
pub const MAX_DICT_ENTRIES: usize = 255;

/// Строка попадает в словарь, только если встречается минимум дважды:
/// одиночная строка в таблице места не экономит.
const MIN_OCCURRENCES: u64 = 2;

/// Таблица «строка ↔ однобайтовый id».
///
/// Пустой словарь валиден: все строки тогда пишутся литералами.
#[derive(Debug, Clone, Default)]
pub struct StringDict {
    by_id: Vec<String>,
    ids: HashMap<String, u8>,
}

impl StringDict {
    /// Пустой словарь (деградация к всегда-литеральным строкам).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Один проход по всему дереву: подсчёт вхождений каждой различной
    /// строки, отбор до [`MAX_DICT_ENTRIES`] по убыванию частоты.
    /// Ничьи разрешаются порядком первого появления — результат детерминирован.
    pub fn build(root: &TagMap) -> Self {
        let mut counts: HashMap<&str, (u64, usize)> = HashMap::new();
        let mut seen = 0usize;
        scan_map(root, &mut counts, &mut seen);

        let mut selected: Vec<(&str, (u64, usize))> = counts
            .into_iter()
            .filter(|(_, (count, _))| *count >= MIN_OCCURRENCES)
            .collect();
        selected.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));
        selected.truncate(MAX_DICT_ENTRIES);

        Self::from_strings(selected.into_iter().map(|(s, _)| s.to_string()).collect())
    }

    fn from_strings(strings: Vec<String>) -> Self {
        let ids = strings
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i as u8))
            .collect();
        Self {
            by_id: strings,
            ids,
        }
    }

    /// Сериализует таблицу: байт count, затем строки в порядке id
    /// (варинт-длина + UTF-8).
    pub fn write<W: Write>(&self, w: &mut W) -> CodecResult<()> {
        w.write_u8(self.by_id.len() as u8)?;
        for s in &self.by_id {
            let len = u32::try_from(s.len()).map_err(|_| {
                FormatError::UnsupportedTag(format!("dictionary string of {} bytes", s.len()))
            })?;
            write_varint(w, len)?;
            w.write_all(s.as_bytes())?;
        }
        Ok(())
    }

    /// Обратная операция: восстанавливает обе проекции таблицы.
    /// Длина каждой строки списывается из бюджета до чтения байтов.
    pub fn read<R: Read>(r: &mut R, budget: &mut AllocBudget) -> CodecResult<Self> {
        let count = r.read_u8()?;
        let mut strings = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = read_varint(r)?;
            budget.charge(len as u64)?;
            let mut buf = vec![0u8; len as usize];
            r.read_exact(&mut buf)?;
            strings.push(String::from_utf8(buf)?);
        }
        Ok(Self::from_strings(strings))
    }

    /// Id строки, если она была отобрана (иначе строка пишется литералом).
    pub fn id_of(&self, s: &str) -> Option<u8> {
        self.ids.get(s).copied()
    }

    /// Строка по id из загруженной таблицы.
    ///
    /// # Errors
    /// [`FormatError::InvalidReference`], если id выходит за границы таблицы —
    /// единственный отказ словаря.
    pub fn lookup(&self, id: u8) -> CodecResult<&str> {
        self.by_id
            .get(id as usize)
            .map(String::as_str)
            .ok_or_else(|| {
                FormatError::InvalidReference {
                    id,
                    len: self.by_id.len(),
                }
                .into()
            })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn scan_map<'a>(map: &'a TagMap, counts: &mut HashMap<&'a str, (u64, usize)>, seen: &mut usize) {
    for (key, value) in map.iter() {
        note(key, counts, seen);
        scan_tag(value, counts, seen);
    }
}

fn scan_tag<'a>(tag: &'a Tag, counts: &mut HashMap<&'a str, (u64, usize)>, seen: &mut usize) {
    match tag {
        Tag::String(s) => note(s, counts, seen),
        Tag::List(items) => {
            for item in items {
                scan_tag(item, counts, seen);
            }
        }
        Tag::Map(m) => scan_map(m, counts, seen),
        _ => {}
    }
}

fn note<'a>(s: &'a str, counts: &mut HashMap<&'a str, (u64, usize)>, seen: &mut usize) {
    let entry = counts.entry(s).or_insert_with(|| {
        let first = *seen;
        *seen += 1;
        (0, first)
    });
    entry.0 += 1;
}
