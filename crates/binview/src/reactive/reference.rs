// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Accessor, Live, ReactiveContext, ToRaw};
use crate::descriptor::DescriptorRef;
use crate::error::Result;
use crate::value::Value;
use std::fmt;

/// Single-value handle bound to any descriptor.
///
/// For leaves `get` decodes the current bytes; for composites it returns the
/// bound view. `set` always writes through the descriptor.
#[derive(Clone)]
pub struct Ref {
    desc: DescriptorRef,
    ctx: ReactiveContext,
    accessor: Accessor,
}

impl Ref {
    pub(crate) fn new(desc: DescriptorRef, ctx: ReactiveContext) -> Self {
        let accessor = Accessor::bind(&desc, ctx.clone());
        Self {
            desc,
            ctx,
            accessor,
        }
    }

    pub fn descriptor(&self) -> &DescriptorRef {
        &self.desc
    }

    pub fn absolute_offset(&self) -> Result<usize> {
        self.ctx.absolute_offset()
    }

    pub fn get(&self) -> Result<Live> {
        self.accessor.resolve()
    }

    pub fn set(&self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let at = self.ctx.absolute_offset()?;
        let endian = self.ctx.endian();
        let desc = &self.desc;
        self.ctx
            .with_bytes_mut(|buf| desc.write(buf, at, endian, &value).map(|_| ()))
    }
}

impl ToRaw for Ref {
    fn to_raw(&self) -> Result<Value> {
        self.get()?.to_raw()
    }
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("type", &self.desc.name())
            .field("local_offset", &self.ctx.local_offset())
            .finish()
    }
}
